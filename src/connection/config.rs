//! Connection configuration

use tracing::Dispatch;

/// What `unlock()` does when the connection is locked on an empty frame
///
/// A connection locked while no bin was attached, or while its bin had no
/// front buffer, holds an empty frame. By default such a connection stays
/// locked after `unlock()`, and later `lock()` calls keep returning the empty
/// frame until a frame is held and released. `Release` returns it to the
/// unlocked state instead so the next `lock()` acquires a fresh frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyFrameUnlock {
    /// Remain locked on the empty frame
    #[default]
    StayLocked,
    /// Transition back to unlocked
    Release,
}

/// Connection configuration options
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Unlock behaviour while holding an empty frame
    pub empty_frame_unlock: EmptyFrameUnlock,

    /// Panic on usage errors (unlock without a prior lock) after logging them
    pub assert_on_misuse: bool,

    /// Diagnostic sink for this connection (global default subscriber if None)
    pub dispatch: Option<Dispatch>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            empty_frame_unlock: EmptyFrameUnlock::StayLocked,
            assert_on_misuse: cfg!(debug_assertions),
            dispatch: None,
        }
    }
}

impl ConnectionConfig {
    /// Set the empty-frame unlock behaviour
    pub fn empty_frame_unlock(mut self, behaviour: EmptyFrameUnlock) -> Self {
        self.empty_frame_unlock = behaviour;
        self
    }

    /// Enable or disable panicking on usage errors
    pub fn assert_on_misuse(mut self, enabled: bool) -> Self {
        self.assert_on_misuse = enabled;
        self
    }

    /// Route this connection's diagnostics to `dispatch`
    pub fn dispatch(mut self, dispatch: Dispatch) -> Self {
        self.dispatch = Some(dispatch);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ConnectionConfig::default();

        assert_eq!(config.empty_frame_unlock, EmptyFrameUnlock::StayLocked);
        assert_eq!(config.assert_on_misuse, cfg!(debug_assertions));
        assert!(config.dispatch.is_none());
    }

    #[test]
    fn test_builder_empty_frame_unlock() {
        let config = ConnectionConfig::default().empty_frame_unlock(EmptyFrameUnlock::Release);

        assert_eq!(config.empty_frame_unlock, EmptyFrameUnlock::Release);
    }

    #[test]
    fn test_builder_chaining() {
        let config = ConnectionConfig::default()
            .assert_on_misuse(false)
            .empty_frame_unlock(EmptyFrameUnlock::Release)
            .dispatch(Dispatch::none());

        assert!(!config.assert_on_misuse);
        assert_eq!(config.empty_frame_unlock, EmptyFrameUnlock::Release);
        assert!(config.dispatch.is_some());
    }
}
