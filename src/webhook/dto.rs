use serde::Deserialize;

/// Twilio's inbound-message webhook form. Only the fields the bot routes
/// on; everything else in the payload is ignored.
#[derive(Debug, Deserialize)]
pub struct TwilioInbound {
    #[serde(rename = "From")]
    pub from: String,
    #[serde(rename = "Body", default)]
    pub body: Option<String>,
    #[serde(rename = "MediaUrl0", default)]
    pub media_url: Option<String>,
}
