//! IP geolocation command handler.

use crate::config::Config;
use crate::error::Result;
use crate::ipinfo::{IpInfo, IpInfoClient};
use colored::Colorize;

/// Look up geolocation details for an IP address.
///
/// Without an argument the lookup resolves the caller's own public IP.
pub async fn run_ipinfo(config: &Config, ip: Option<String>, json: bool) -> Result<()> {
    let client = IpInfoClient::new(&config.ipinfo)?;

    let info = match ip.as_deref() {
        Some(ip) => client.fetch_for(ip).await?,
        None => client.fetch().await?,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        print_info(&info);
    }

    Ok(())
}

fn print_info(info: &IpInfo) {
    println!();
    println!("{} {}", "IP:".bold(), info.query.cyan());
    println!("{} {}", "Location:".bold(), info.formatted_location());
    if !info.zip.is_empty() {
        println!("{} {}", "ZIP:".bold(), info.zip);
    }
    if info.has_valid_coordinates() {
        println!("{} {:.4}, {:.4}", "Coordinates:".bold(), info.lat, info.lon);
    }
    if !info.timezone.is_empty() {
        println!("{} {}", "Timezone:".bold(), info.timezone);
    }
    if !info.isp.is_empty() {
        println!("{} {}", "ISP:".bold(), info.isp);
    }
    if !info.org.is_empty() {
        println!("{} {}", "Org:".bold(), info.org);
    }
    if !info.asn.is_empty() {
        println!("{} {}", "AS:".bold(), info.asn);
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_info() -> IpInfo {
        serde_json::from_str(
            r#"{
                "query": "8.8.8.8",
                "status": "success",
                "country": "United States",
                "countryCode": "US",
                "region": "VA",
                "regionName": "Virginia",
                "city": "Ashburn",
                "zip": "20149",
                "lat": 39.03,
                "lon": -77.5,
                "timezone": "America/New_York",
                "isp": "Google LLC",
                "org": "Google Public DNS",
                "as": "AS15169 Google LLC"
            }"#,
        )
        .expect("decode failed")
    }

    #[test]
    fn test_print_info_smoke() {
        print_info(&sample_info());
    }

    #[test]
    fn test_print_info_tolerates_sparse_payload() {
        let info: IpInfo =
            serde_json::from_str(r#"{"status": "success", "query": "1.2.3.4"}"#)
                .expect("decode failed");
        print_info(&info);
    }
}
