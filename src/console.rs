use crate::gateway::ConfigGateway;
use crate::model::ConfigModel;
use crate::outcome::aggregate;
use crate::types::OperationOutcome;

////////////////////////////////////////////////////////////
// User interaction seams
////////////////////////////////////////////////////////////

/// Modal confirmation gate. Every mutating action asks before any
/// request is dispatched; there is no unconfirmed path.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

/// Busy indicator asserted while a remote operation is in flight.
pub trait Progress {
    fn begin(&self);
    fn end(&self);
}

/// Sink for user-facing outcome notifications.
pub trait Notify {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
}

/// Scoped acquisition of the busy indicator: `end` runs on drop, so it
/// is released exactly once whether the operation succeeds or fails.
struct ProgressGuard<'a> {
    progress: &'a dyn Progress,
}

impl<'a> ProgressGuard<'a> {
    fn begin(progress: &'a dyn Progress) -> Self {
        progress.begin();
        Self { progress }
    }
}

impl Drop for ProgressGuard<'_> {
    fn drop(&mut self) {
        self.progress.end();
    }
}

////////////////////////////////////////////////////////////
// Action orchestration
////////////////////////////////////////////////////////////

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionState {
    Idle,
    AwaitingConfirmation,
    InFlight,
}

const FETCH_ERROR: &str = "Error fetching data";

/// Drives each lifecycle action through confirmation, the remote call
/// and the local refresh. Owns the editable config model; all remote
/// traffic goes through the gateway.
pub struct Console<G: ConfigGateway> {
    gateway: G,
    pub model: ConfigModel,
    confirm: Box<dyn Confirm>,
    progress: Box<dyn Progress>,
    notify: Box<dyn Notify>,
    state: ActionState,
}

impl<G: ConfigGateway> Console<G> {
    pub fn new(
        gateway: G,
        confirm: Box<dyn Confirm>,
        progress: Box<dyn Progress>,
        notify: Box<dyn Notify>,
    ) -> Self {
        Self {
            gateway,
            model: ConfigModel::new(),
            confirm,
            progress,
            notify,
            state: ActionState::Idle,
        }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn state(&self) -> ActionState {
        self.state
    }

    /// Fetch DNS and listener maps. The two reads are independent and
    /// joined: both always run to completion, each failure is reported
    /// on its own, and a failed side leaves its local collection
    /// untouched (stale but consistent).
    pub async fn fetch_data(&mut self) {
        self.state = ActionState::InFlight;
        {
            let _busy = ProgressGuard::begin(self.progress.as_ref());
            let (dns, listeners) =
                tokio::join!(self.gateway.fetch_dns(), self.gateway.fetch_listeners());

            match dns {
                Ok(map) => self.model.set_dns(map),
                Err(e) => {
                    log::warn!("dns fetch failed: {}", e);
                    self.notify.error(FETCH_ERROR);
                }
            }

            match listeners {
                Ok(map) => self.model.set_listeners(map),
                Err(e) => {
                    log::warn!("listener fetch failed: {}", e);
                    self.notify.error(FETCH_ERROR);
                }
            }
        }
        self.state = ActionState::Idle;
    }

    /// Save the edit buffer: DNS first, listeners only after the DNS
    /// save succeeded, then refetch so the store picks up any
    /// server-side normalization. A failure leaves the edit buffer
    /// intact for retry.
    pub async fn save(&mut self) {
        let prompt = "This will save the configuration to the server \
                      (write to file) but does not restart the server. Continue?";
        if !self.ask(prompt) {
            return;
        }

        self.state = ActionState::InFlight;
        let saved = {
            let _busy = ProgressGuard::begin(self.progress.as_ref());

            let dns = self.model.dns_mapping();
            let listeners = self.model.listener_mapping();

            match self.gateway.save_dns(&dns).await {
                Ok(_) => match self.gateway.save_listeners(&listeners).await {
                    Ok(_) => {
                        self.notify.success("Configuration saved successfully");
                        true
                    }
                    Err(e) => {
                        log::warn!("listener save failed: {}", e);
                        self.notify.error("Error saving listener configuration");
                        false
                    }
                },
                Err(e) => {
                    log::warn!("dns save failed: {}", e);
                    self.notify.error("Error saving DNS configuration");
                    false
                }
            }
        };
        self.state = ActionState::Idle;

        if saved {
            self.fetch_data().await;
        }
    }

    /// Start the service. The answer may be service-level ("already
    /// running") or per-listener; both go through the aggregator.
    pub async fn start(&mut self) {
        if !self.ask("This will start the server with the last saved configuration. Continue?") {
            return;
        }

        self.state = ActionState::InFlight;
        {
            let _busy = ProgressGuard::begin(self.progress.as_ref());
            let result = self.gateway.start().await;
            self.report_outcome("Service started", result);
        }
        self.state = ActionState::Idle;
    }

    /// Restart every listener from the last saved configuration.
    pub async fn restart(&mut self) {
        let prompt = "This will restart the server according to the last saved \
                      configuration. All connections will be interrupted. Continue?";
        if !self.ask(prompt) {
            return;
        }

        self.state = ActionState::InFlight;
        {
            let _busy = ProgressGuard::begin(self.progress.as_ref());
            let result = self.gateway.restart().await;
            self.report_outcome("Server restarted", result);
        }
        self.state = ActionState::Idle;
    }

    pub async fn stop(&mut self) {
        if !self.ask("This will stop the server. All connections will be interrupted. Continue?") {
            return;
        }

        self.state = ActionState::InFlight;
        {
            let _busy = ProgressGuard::begin(self.progress.as_ref());
            match self.gateway.stop().await {
                Ok(simple) => {
                    let summary = aggregate(&OperationOutcome::Simple(simple));
                    let line = summary.render("Service stopped");
                    if summary.is_error() {
                        self.notify.error(&line);
                    } else {
                        self.notify.success(&line);
                    }
                }
                Err(e) => {
                    log::warn!("stop failed: {}", e);
                    self.notify.error("Error stopping service");
                }
            }
        }
        self.state = ActionState::Idle;
    }

    /// Discard unapplied edits on the server, rolling its saved config
    /// back to the last applied one, then refetch.
    pub async fn restore(&mut self) {
        let prompt = "This will restore the server's config to the last applied \
                      config and discard any unapplied config. Continue?";
        if !self.ask(prompt) {
            return;
        }

        self.state = ActionState::InFlight;
        let restored = {
            let _busy = ProgressGuard::begin(self.progress.as_ref());
            match self.gateway.restore().await {
                Ok(_) => {
                    self.notify.success("Configuration restored successfully");
                    true
                }
                Err(e) => {
                    log::warn!("restore failed: {}", e);
                    self.notify.error("Error restoring configuration");
                    false
                }
            }
        };
        self.state = ActionState::Idle;

        if restored {
            self.fetch_data().await;
        }
    }

    fn ask(&mut self, prompt: &str) -> bool {
        self.state = ActionState::AwaitingConfirmation;
        let confirmed = self.confirm.confirm(prompt);
        if !confirmed {
            log::info!("action cancelled by user");
            self.state = ActionState::Idle;
        }
        confirmed
    }

    fn report_outcome(&self, action: &str, result: crate::error::Result<OperationOutcome>) {
        match result {
            Ok(outcome) => {
                let summary = aggregate(&outcome);
                let line = summary.render(action);
                if summary.is_error() {
                    self.notify.error(&line);
                } else {
                    self.notify.success(&line);
                }
            }
            Err(e) => {
                log::warn!("{} failed: {}", action, e);
                self.notify.error(&format!("Error: {} request failed", action));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use crate::types::{Listener, ListenerStats, ListenerStatus, SimpleResult};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct MockGateway {
        calls: Mutex<Vec<&'static str>>,
        fail_dns_fetch: bool,
        fail_dns_save: bool,
        restart_outcome: Option<OperationOutcome>,
    }

    impl MockGateway {
        fn record(&self, call: &'static str) {
            self.calls.lock().unwrap().push(call);
        }

        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ConfigGateway for Arc<MockGateway> {
        async fn fetch_dns(&self) -> Result<HashMap<String, String>> {
            self.record("fetch_dns");
            if self.fail_dns_fetch {
                return Err(Error::HttpError("status: 500".to_string()));
            }
            Ok(HashMap::from([("foo".to_string(), "bar".to_string())]))
        }

        async fn save_dns(
            &self,
            _map: &HashMap<String, String>,
        ) -> Result<HashMap<String, String>> {
            self.record("save_dns");
            if self.fail_dns_save {
                return Err(Error::HttpError("status: 500".to_string()));
            }
            Ok(HashMap::new())
        }

        async fn fetch_listeners(&self) -> Result<HashMap<String, Listener>> {
            self.record("fetch_listeners");
            Ok(HashMap::from([(
                "l1".to_string(),
                Listener::new("0.0.0.0:443".to_string(), 8443),
            )]))
        }

        async fn save_listeners(
            &self,
            _map: &HashMap<String, Listener>,
        ) -> Result<HashMap<String, Listener>> {
            self.record("save_listeners");
            Ok(HashMap::new())
        }

        async fn listener_statuses(&self) -> Result<HashMap<String, ListenerStatus>> {
            self.record("listener_statuses");
            Ok(HashMap::new())
        }

        async fn listener_stats(&self) -> Result<HashMap<String, ListenerStats>> {
            self.record("listener_stats");
            Ok(HashMap::new())
        }

        async fn start(&self) -> Result<OperationOutcome> {
            self.record("start");
            Ok(OperationOutcome::Simple(SimpleResult {
                success: true,
                changed: false,
                message: None,
            }))
        }

        async fn stop(&self) -> Result<SimpleResult> {
            self.record("stop");
            Ok(SimpleResult {
                success: true,
                changed: true,
                message: None,
            })
        }

        async fn restart(&self) -> Result<OperationOutcome> {
            self.record("restart");
            Ok(self
                .restart_outcome
                .clone()
                .unwrap_or(OperationOutcome::PerListener(HashMap::new())))
        }

        async fn restore(&self) -> Result<String> {
            self.record("restore");
            Ok("OK".to_string())
        }
    }

    struct Always(bool);

    impl Confirm for Always {
        fn confirm(&self, _prompt: &str) -> bool {
            self.0
        }
    }

    #[derive(Default)]
    struct CountingProgress {
        begun: AtomicUsize,
        ended: AtomicUsize,
    }

    impl Progress for Arc<CountingProgress> {
        fn begin(&self) {
            self.begun.fetch_add(1, Ordering::SeqCst);
        }

        fn end(&self) {
            self.ended.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[derive(Default)]
    struct RecordingNotify {
        events: Mutex<Vec<(bool, String)>>,
    }

    impl RecordingNotify {
        fn successes(&self) -> Vec<String> {
            self.events
                .lock()
                .unwrap()
                .iter()
                .filter(|(ok, _)| *ok)
                .map(|(_, m)| m.clone())
                .collect()
        }

        fn errors(&self) -> Vec<String> {
            self.events
                .lock()
                .unwrap()
                .iter()
                .filter(|(ok, _)| !*ok)
                .map(|(_, m)| m.clone())
                .collect()
        }
    }

    impl Notify for Arc<RecordingNotify> {
        fn success(&self, message: &str) {
            self.events.lock().unwrap().push((true, message.to_string()));
        }

        fn error(&self, message: &str) {
            self.events.lock().unwrap().push((false, message.to_string()));
        }
    }

    struct Fixture {
        gateway: Arc<MockGateway>,
        progress: Arc<CountingProgress>,
        notify: Arc<RecordingNotify>,
    }

    fn console(gateway: MockGateway, confirmed: bool) -> (Console<Arc<MockGateway>>, Fixture) {
        let gateway = Arc::new(gateway);
        let progress = Arc::new(CountingProgress::default());
        let notify = Arc::new(RecordingNotify::default());

        let console = Console::new(
            gateway.clone(),
            Box::new(Always(confirmed)),
            Box::new(progress.clone()),
            Box::new(notify.clone()),
        );

        let fixture = Fixture {
            gateway,
            progress,
            notify,
        };
        (console, fixture)
    }

    #[tokio::test]
    async fn test_fetch_data_populates_model() {
        let (mut console, fx) = console(MockGateway::default(), true);

        console.fetch_data().await;

        assert_eq!(console.model.dns.get("foo"), Some(&"bar".to_string()));
        assert!(console.model.listeners.contains_key("l1"));
        assert_eq!(console.state(), ActionState::Idle);
        assert!(fx.notify.errors().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_data_failed_side_leaves_state_untouched() {
        let gateway = MockGateway {
            fail_dns_fetch: true,
            ..Default::default()
        };
        let (mut console, fx) = console(gateway, true);
        console.model.replace_dns("stale", "1.2.3.4");

        console.fetch_data().await;

        // dns fetch failed: old dns entries stay, listener side applied
        assert_eq!(console.model.dns.get("stale"), Some(&"1.2.3.4".to_string()));
        assert!(console.model.listeners.contains_key("l1"));
        assert_eq!(fx.notify.errors(), vec![FETCH_ERROR.to_string()]);
    }

    #[tokio::test]
    async fn test_denied_confirmation_dispatches_nothing() {
        let (mut console, fx) = console(MockGateway::default(), false);

        console.save().await;
        console.restart().await;
        console.stop().await;
        console.restore().await;

        assert!(fx.gateway.calls().is_empty());
        assert_eq!(console.state(), ActionState::Idle);
    }

    #[tokio::test]
    async fn test_save_sequences_dns_then_listeners_then_refetch() {
        let (mut console, fx) = console(MockGateway::default(), true);

        console.save().await;

        assert_eq!(
            fx.gateway.calls(),
            vec!["save_dns", "save_listeners", "fetch_dns", "fetch_listeners"]
        );
        assert_eq!(
            fx.notify.successes(),
            vec!["Configuration saved successfully".to_string()]
        );
    }

    #[tokio::test]
    async fn test_failed_dns_save_suppresses_listener_save() {
        let gateway = MockGateway {
            fail_dns_save: true,
            ..Default::default()
        };
        let (mut console, fx) = console(gateway, true);

        console.save().await;

        assert_eq!(fx.gateway.calls(), vec!["save_dns"]);
        assert!(fx.notify.successes().is_empty());
        // busy indicator released exactly once despite the failure
        assert_eq!(fx.progress.begun.load(Ordering::SeqCst), 1);
        assert_eq!(fx.progress.ended.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_restart_reports_mixed_outcome_as_error() {
        let gateway = MockGateway {
            restart_outcome: Some(OperationOutcome::PerListener(HashMap::from([
                ("a".to_string(), ListenerStatus::Ok(true)),
                (
                    "b".to_string(),
                    ListenerStatus::Err {
                        message: "bad address".to_string(),
                    },
                ),
            ]))),
            ..Default::default()
        };
        let (mut console, fx) = console(gateway, true);

        console.restart().await;

        assert_eq!(
            fx.notify.errors(),
            vec!["Server restarted. 1 listeners OK, 1 listeners failed".to_string()]
        );
    }

    #[tokio::test]
    async fn test_start_already_running_is_not_counted() {
        let (mut console, fx) = console(MockGateway::default(), true);

        console.start().await;

        assert_eq!(
            fx.notify.successes(),
            vec!["Service started: no change".to_string()]
        );
    }

    #[tokio::test]
    async fn test_restore_refetches_on_success() {
        let (mut console, fx) = console(MockGateway::default(), true);

        console.restore().await;

        assert_eq!(
            fx.gateway.calls(),
            vec!["restore", "fetch_dns", "fetch_listeners"]
        );
    }

    #[tokio::test]
    async fn test_progress_balanced_across_actions() {
        let (mut console, fx) = console(MockGateway::default(), true);

        console.fetch_data().await;
        console.save().await;
        console.stop().await;

        let begun = fx.progress.begun.load(Ordering::SeqCst);
        let ended = fx.progress.ended.load(Ordering::SeqCst);
        assert_eq!(begun, ended);
        assert!(begun > 0);
    }
}
