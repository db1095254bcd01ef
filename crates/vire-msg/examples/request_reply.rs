//! ---
//! vire_section: "02-messaging-ipc-data-model"
//! vire_subsection: "example"
//! vire_type: "source"
//! vire_scope: "code"
//! vire_description: "Example assembling a resource execution request and its reply."
//! vire_version: "v0.0.0-prealpha"
//! vire_owner: "tbd"
//! ---

use anyhow::{Context, Result};
use vire_common::config::AppConfig;
use vire_common::init_tracing;
use vire_msg::{
    CborCodec, Message, MessageFactory, Payload, ResourceExecSuccessResponse,
    ResourceExecRequest, ResourceStatusRecord, TreeDump, TypeIdentified, WireCodec,
};

fn main() -> Result<()> {
    let config: AppConfig = r#"
        [envelope]
        emitter = "vire.client.0"

        [envelope.metadata]
        user = "John"

        [logging]
        format = "pretty"
    "#
    .parse()?;
    init_tracing("vire-request-reply", &config.logging)?;

    let client = MessageFactory::from_config(&config.envelope)?;
    let server = MessageFactory::new("vire.server", client.body_layout_id().clone());
    let codec = CborCodec::new();

    let mut request =
        ResourceExecRequest::new("SuperNEMO:/Demonstrator/CMS/Coil/Control/Voltage/__dp_write__");
    request.add_input_argument_with_meta("value", "503.4", "unit=V")?;
    let outgoing = client.request(request)?;
    print!("{}", outgoing.to_tree_string("Request message:"));

    let bytes = codec.encode(Message::WIRE_TYPE_ID, &outgoing)?;
    let incoming = codec
        .decode(Message::WIRE_TYPE_ID, &bytes)
        .context("decoding request")?;

    let path = incoming
        .payload()
        .and_then(Payload::as_resource_exec_request)
        .map(|request| request.path().to_owned())
        .context("request payload expected")?;
    let mut status = ResourceStatusRecord::new(path, vire_common::time::now());
    status.set_pending(true);
    let mut response = ResourceExecSuccessResponse::with_status(status);
    response.add_output_argument_with_meta("value", "503.4", "unit=V")?;

    let reply = server.reply(incoming.header(), response)?;
    print!("{}", reply.to_tree_string("Reply message:"));
    println!("encoded request size: {} bytes", bytes.len());
    Ok(())
}
