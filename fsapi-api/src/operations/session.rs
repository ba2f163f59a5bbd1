//! Session lifecycle operations

use crate::error::DecodeError;
use crate::operation::FsapiOperation;
use crate::response::Response;

/// `CREATE_SESSION` - exchange the PIN for a session id
#[derive(Debug, Clone, Copy, Default)]
pub struct CreateSession;

impl FsapiOperation for CreateSession {
    type Output = String;

    fn path(&self) -> String {
        "CREATE_SESSION".to_string()
    }

    fn parse_response(&self, response: &Response) -> Result<Self::Output, DecodeError> {
        response.session_id()
    }
}

/// `DELETE_SESSION` - release the current session on the device
#[derive(Debug, Clone, Copy, Default)]
pub struct DeleteSession;

impl FsapiOperation for DeleteSession {
    type Output = ();

    fn path(&self) -> String {
        "DELETE_SESSION".to_string()
    }

    fn parse_response(&self, _response: &Response) -> Result<Self::Output, DecodeError> {
        Ok(())
    }
}
