use serde::Serialize;

use crate::error::EncodeError;

/// Turns a payload into the request body handed to the transport.
pub trait Encoder<P>: Send + Sync {
    fn encode(&self, payload: &P) -> Result<Vec<u8>, EncodeError>;
}

// JSON body, the format the document endpoint expects
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEncoder;

impl<P: Serialize> Encoder<P> for JsonEncoder {
    fn encode(&self, payload: &P) -> Result<Vec<u8>, EncodeError> {
        Ok(serde_json::to_vec(payload)?)
    }
}
