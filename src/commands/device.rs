use crate::api::entities::DeviceInfo;
use crate::cli::DeviceCommand;
use crate::commands::{print_json, print_table};
use crate::session::{Connector, Session};
use anyhow::Result;
use std::io::Write;

const DEVICE_COLUMNS: [&str; 4] = ["ID", "Type", "Name", "Status"];

pub async fn run<C, W>(command: DeviceCommand, session: &Session<C>, out: &mut W) -> Result<()>
where
    C: Connector,
    W: Write,
{
    match command {
        DeviceCommand::List { json } => {
            let devices = session.devices().await?;
            render(&devices, json, out)
        }
    }
}

fn render<W: Write>(devices: &[DeviceInfo], json: bool, out: &mut W) -> Result<()> {
    if json {
        return print_json(out, devices);
    }
    let rows = devices.iter().map(|device| {
        vec![
            device.id.clone(),
            device.device_type.clone(),
            device.name.clone(),
            device.status.clone(),
        ]
    });
    print_table(out, &DEVICE_COLUMNS, rows)
}
