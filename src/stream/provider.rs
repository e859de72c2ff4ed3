//! Stream collaborator interface

use crate::connection::ConnectionHandle;

use super::description::StreamDescription;
use super::parameter::{CommandId, ParameterBin, ParameterId};

/// The stream a connection was created from
///
/// A stream executes parameter and command requests on behalf of a
/// connection. It always outlives the connections built from it.
pub trait Stream: Send + Sync {
    /// Description of the stream
    fn description(&self) -> StreamDescription;

    /// Apply a parameter value for `connection`
    fn set_parameter(&self, connection: ConnectionHandle, id: ParameterId, data: &[u8]);

    /// Read a parameter for `connection`
    ///
    /// `None` means the stream produced no result.
    fn get_parameter(&self, connection: ConnectionHandle, id: ParameterId)
        -> Option<ParameterBin>;

    /// Run a command for `connection`
    fn invoke(
        &self,
        connection: ConnectionHandle,
        command: CommandId,
        data: &[u8],
    ) -> Option<ParameterBin>;
}
