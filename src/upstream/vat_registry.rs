use std::time::Duration;

use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::warn;

use crate::models::VatCheckResult;

const SOAP_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";
const CRP_NS: &str = "http://adis.mfcr.cz/rozhraniCRPDPH/";
const SOAP_ACTION: &str = "getStatusNespolehlivyPlatce";

/// Client for the MFCR unreliable-VAT-payer registry (SOAP operation
/// getStatusNespolehlivyPlatce).
///
/// The lookup is deliberately soft: any failure (bad input, transport
/// error, unparseable XML) degrades to a "reliable" default with
/// `auto_checked: false` so the invoice workflow never blocks on the
/// registry being reachable.
pub struct VatRegistryClient {
    http: reqwest::Client,
    service_url: String,
}

impl VatRegistryClient {
    pub fn new(service_url: String) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();
        Self { http, service_url }
    }

    /// Check a VAT number (any format, e.g. "CZ25083062", "250 830 62").
    pub async fn check_reliability(&self, vat_input: &str) -> VatCheckResult {
        // The registry wants the bare DIC: digits only.
        let vat_number: String = vat_input.chars().filter(|c| c.is_ascii_digit()).collect();

        if vat_number.is_empty() {
            return VatCheckResult::error("Invalid VAT number - no digits found", vat_number);
        }

        let body = match self.call_service(&vat_number).await {
            Ok(body) => body,
            Err(e) => {
                warn!("VAT registry call failed: {}", e);
                return VatCheckResult::error(
                    "Error: could not get response from VAT service",
                    vat_number,
                );
            }
        };

        match payer_status_attr(&body, &vat_number) {
            Err(e) => {
                warn!("VAT registry response not parseable: {}", e);
                VatCheckResult::error("Error: could not parse VAT service response", vat_number)
            }
            Ok(None) => VatCheckResult {
                status: "not_found".to_string(),
                reliable_vat_payer: "NA".to_string(),
                message: "VAT payer not found in registry".to_string(),
                auto_checked: true,
                vat_number_clean: vat_number,
            },
            Ok(Some(flag)) => {
                let (status_text, reliable_value) =
                    interpret_status(flag.trim().to_uppercase().as_str());
                VatCheckResult {
                    status: "success".to_string(),
                    reliable_vat_payer: reliable_value.to_string(),
                    message: format!("VAT Tax payer status: {}", status_text),
                    auto_checked: true,
                    vat_number_clean: vat_number,
                }
            }
        }
    }

    async fn call_service(&self, vat_number: &str) -> Result<String, reqwest::Error> {
        let response = self
            .http
            .post(&self.service_url)
            .header("Content-Type", "text/xml; charset=utf-8")
            .header("SOAPAction", SOAP_ACTION)
            .body(build_envelope(vat_number))
            .send()
            .await?
            .error_for_status()?;

        response.text().await
    }
}

/// Build the request body for getStatusNespolehlivyPlatce.
fn build_envelope(vat_number: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<soapenv:Envelope xmlns:soapenv="{SOAP_NS}">
  <soapenv:Body>
    <StatusNespolehlivyPlatceRequest xmlns="{CRP_NS}">
      <dic>{vat_number}</dic>
    </StatusNespolehlivyPlatceRequest>
  </soapenv:Body>
</soapenv:Envelope>"#
    )
}

/// Map the nespolehlivyPlatce attribute to (status text, stored flag).
/// Anything other than ANO/NE (including NENALEZEN) counts as not found.
fn interpret_status(status: &str) -> (&'static str, &'static str) {
    match status {
        "ANO" => ("Unreliable", "false"),
        "NE" => ("Reliable", "true"),
        _ => ("Not found", "NA"),
    }
}

/// Find the `statusPlatceDPH` element whose `dic` attribute matches the
/// queried number and return its `nespolehlivyPlatce` attribute.
/// `Ok(None)` means no matching element: the payer is not in the
/// registry.
fn payer_status_attr(xml: &str, dic: &str) -> Result<Option<String>, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) => {
                if e.local_name().as_ref() != b"statusPlatceDPH" {
                    continue;
                }

                let mut element_dic = None;
                let mut flag = String::new();
                for attr in e.attributes().flatten() {
                    // plain ASCII attribute values, no entities to unescape
                    let value = String::from_utf8_lossy(attr.value.as_ref()).into_owned();
                    match attr.key.local_name().as_ref() {
                        b"dic" => element_dic = Some(value),
                        b"nespolehlivyPlatce" => flag = value,
                        _ => {}
                    }
                }

                if element_dic.as_deref() == Some(dic) {
                    return Ok(Some(flag));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(None)
}
