use colored::*;
use sharescout_common::device::DeviceRecord;
use sharescout_core::probe::{ServiceEndpoint, ShareDescriptor};
use sharescout_core::session::FileDescriptor;

pub fn devices(records: &[DeviceRecord]) {
    if records.is_empty() {
        println!("{}", "no devices discovered".yellow());
        return;
    }
    for record in records {
        let label = if record.name.is_empty() {
            record.ip.as_str()
        } else {
            record.name.as_str()
        };
        println!("{} {}", "▸".bright_black(), label.bright_green().bold());
        if !record.ip.is_empty() {
            detail("address", record.ip.as_str().normal());
        }
        if !record.mac.is_empty() {
            detail("mac", record.mac.as_str().normal());
        }
        if !record.service_type.is_empty() {
            detail("service", record.service_type.as_str().cyan());
        }
        detail("seen via", record.source_hint().dimmed());
    }
}

pub fn endpoints(endpoints: &[ServiceEndpoint]) {
    if endpoints.is_empty() {
        println!("{}", "no share endpoints found".yellow());
        return;
    }
    for endpoint in endpoints {
        println!(
            "{} {}",
            "▸".bright_black(),
            format!("{}:{}", endpoint.host, endpoint.port)
                .bright_green()
                .bold()
        );
        for share in &endpoint.shares {
            detail(&share.name, share.path.as_str().normal());
        }
    }
}

pub fn shares(shares: &[ShareDescriptor]) {
    if shares.is_empty() {
        println!("{}", "no shares exposed".yellow());
        return;
    }
    for share in shares {
        detail(&share.name, share.path.as_str().normal());
    }
}

pub fn files(files: &[FileDescriptor]) {
    if files.is_empty() {
        println!("{}", "share is empty".yellow());
        return;
    }
    for file in files {
        println!(
            "  {:>10}  {}",
            file.size.to_string().bright_black(),
            file.name
        );
    }
}

fn detail(key: &str, value: ColoredString) {
    println!("  {:<10}{} {}", key.bright_black(), ":".bright_black(), value);
}
