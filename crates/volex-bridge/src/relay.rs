//! Radio notification handling: request relay and delivery reports.

use volex_protocol::{InboundRequest, MacAddress, ProtocolError};

use crate::bridge::Bridge;
use crate::hal::{Clock, Serial};
use crate::radio::{DeliveryStatus, Radio, RadioEvent};

impl<S: Serial, R: Radio, C: Clock> Bridge<S, R, C> {
    /// Handle one notification from the radio adapter.
    pub fn handle_radio_event(&mut self, event: RadioEvent) {
        match event {
            RadioEvent::Received { from, data } => self.relay_request(from, &data),
            RadioEvent::DeliveryStatus { to, status } => self.report_delivery(to, status),
        }
    }

    /// Relay a tagged request to the host as `[tx]<address>|<body>`; log and
    /// drop anything else.
    fn relay_request(&mut self, from: MacAddress, data: &[u8]) {
        match InboundRequest::parse(from, data) {
            Ok(request) => {
                self.link.send(&request.relay_text());
                self.stats.requests_relayed += 1;
            }
            Err(ProtocolError::InvalidRequest(text)) => {
                self.link.log(&format!("Invalid request: {}", text));
                self.stats.requests_rejected += 1;
            }
            Err(e) => {
                log::warn!("unexpected error for frame from {}: {}", from, e);
                self.stats.requests_rejected += 1;
            }
        }
    }

    fn report_delivery(&mut self, to: MacAddress, status: DeliveryStatus) {
        log::debug!("delivery to {}: {:?}", to, status);
        match status {
            DeliveryStatus::Success => {
                self.stats.deliveries_succeeded += 1;
                self.link.log("Delivery Success");
            }
            DeliveryStatus::Fail => {
                self.stats.deliveries_failed += 1;
                self.link.log("Delivery Fail");
            }
        }
    }
}
