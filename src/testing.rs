//! Test doubles for connection tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use parking_lot::Mutex;
use tracing::Dispatch;

use crate::connection::ConnectionHandle;
use crate::frame_bin::{Bin, BinHandle, Frame, FrameIndex, FrontBufferReady};
use crate::signal::{Callback, CallbackId, Signal};
use crate::stream::{CommandId, ParameterBin, ParameterId, Stream, StreamDescription};

/// Command that echoes its input back as the result
pub(crate) const ECHO_COMMAND: CommandId = 1;

/// Result storage that counts its own drops
struct TrackedBuffer {
    data: Vec<u8>,
    drops: Arc<AtomicUsize>,
}

impl AsRef<[u8]> for TrackedBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

impl Drop for TrackedBuffer {
    fn drop(&mut self) {
        self.drops.fetch_add(1, Ordering::SeqCst);
    }
}

/// Stream with a parameter table and an echo command
///
/// Every result it hands out is freshly allocated and tracked, so tests can
/// check that discarded results are actually freed.
pub(crate) struct ScriptedStream {
    values: Mutex<HashMap<ParameterId, Vec<u8>>>,
    callers: Mutex<Vec<ConnectionHandle>>,
    created: AtomicUsize,
    drops: Arc<AtomicUsize>,
}

impl ScriptedStream {
    pub(crate) fn new() -> Self {
        Self {
            values: Mutex::new(HashMap::new()),
            callers: Mutex::new(Vec::new()),
            created: AtomicUsize::new(0),
            drops: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub(crate) fn set_value(&self, id: ParameterId, value: &[u8]) {
        self.values.lock().insert(id, value.to_vec());
    }

    /// Connections that called into the stream, in call order
    pub(crate) fn callers(&self) -> Vec<ConnectionHandle> {
        self.callers.lock().clone()
    }

    /// Results handed out and not yet freed
    pub(crate) fn live_results(&self) -> usize {
        self.created.load(Ordering::SeqCst) - self.results_dropped()
    }

    pub(crate) fn results_dropped(&self) -> usize {
        self.drops.load(Ordering::SeqCst)
    }

    fn tracked(&self, data: &[u8]) -> ParameterBin {
        self.created.fetch_add(1, Ordering::SeqCst);
        ParameterBin::from(Bytes::from_owner(TrackedBuffer {
            data: data.to_vec(),
            drops: Arc::clone(&self.drops),
        }))
    }
}

impl Stream for ScriptedStream {
    fn description(&self) -> StreamDescription {
        StreamDescription::new(1, 0)
    }

    fn set_parameter(&self, connection: ConnectionHandle, id: ParameterId, data: &[u8]) {
        self.callers.lock().push(connection);
        self.set_value(id, data);
    }

    fn get_parameter(
        &self,
        connection: ConnectionHandle,
        id: ParameterId,
    ) -> Option<ParameterBin> {
        self.callers.lock().push(connection);
        let value = self.values.lock().get(&id).cloned()?;
        Some(self.tracked(&value))
    }

    fn invoke(
        &self,
        connection: ConnectionHandle,
        command: CommandId,
        data: &[u8],
    ) -> Option<ParameterBin> {
        self.callers.lock().push(connection);
        if command == ECHO_COMMAND {
            Some(self.tracked(data))
        } else {
            None
        }
    }
}

/// Bin that records attachment traffic and every callback it was given
pub(crate) struct RecordingBin {
    handle: BinHandle,
    front: Mutex<Option<Frame>>,
    connected: AtomicI64,
    inc_calls: AtomicUsize,
    dec_calls: AtomicUsize,
    ready: Signal<FrontBufferReady>,
    registered: Mutex<Vec<Callback<FrontBufferReady>>>,
}

impl RecordingBin {
    pub(crate) fn new() -> Self {
        Self {
            handle: BinHandle::next(),
            front: Mutex::new(None),
            connected: AtomicI64::new(0),
            inc_calls: AtomicUsize::new(0),
            dec_calls: AtomicUsize::new(0),
            ready: Signal::new(),
            registered: Mutex::new(Vec::new()),
        }
    }

    /// Raise front-buffer-ready to current subscribers
    pub(crate) fn raise(&self, frame_index: FrameIndex) {
        *self.front.lock() = Some(Frame::new(frame_index, Bytes::new()));
        self.ready.raise(&FrontBufferReady {
            bin: self.handle,
            frame_index,
        });
    }

    pub(crate) fn connected(&self) -> i64 {
        self.connected.load(Ordering::SeqCst)
    }

    pub(crate) fn inc_calls(&self) -> usize {
        self.inc_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn dec_calls(&self) -> usize {
        self.dec_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn callback_count(&self) -> usize {
        self.ready.len()
    }

    /// Most recently registered callback, kept even after unregistering
    pub(crate) fn last_registered(&self) -> Option<Callback<FrontBufferReady>> {
        self.registered.lock().last().cloned()
    }
}

impl Bin for RecordingBin {
    fn handle(&self) -> BinHandle {
        self.handle
    }

    fn lock_front_buffer(&self) -> Option<Frame> {
        self.front.lock().clone()
    }

    fn unlock_front_buffer(&self) {}

    fn inc_connected(&self) {
        self.inc_calls.fetch_add(1, Ordering::SeqCst);
        self.connected.fetch_add(1, Ordering::SeqCst);
    }

    fn dec_connected(&self) {
        self.dec_calls.fetch_add(1, Ordering::SeqCst);
        self.connected.fetch_sub(1, Ordering::SeqCst);
    }

    fn register_front_buffer_ready_callback(
        &self,
        callback: Callback<FrontBufferReady>,
    ) -> CallbackId {
        self.registered.lock().push(Arc::clone(&callback));
        self.ready.subscribe_shared(callback)
    }

    fn unregister_front_buffer_ready_callback(&self, id: &mut CallbackId) {
        self.ready.unsubscribe(id);
    }
}

/// In-memory log sink for an injected `Dispatch`
#[derive(Clone, Default)]
pub(crate) struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub(crate) fn dispatch(&self) -> Dispatch {
        let logs = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || logs.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::TRACE)
            .finish();
        Dispatch::new(subscriber)
    }

    pub(crate) fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
