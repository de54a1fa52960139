use std::sync::{Arc, Mutex};

use tokio_util::sync::CancellationToken;

use crate::bridge::{
    bootstrap_script, bridge_channel, report_login_listener, HostEndpoint, LoopbackInjector,
    PageApi, PageInjector,
};
use crate::detection::{ArmedTriggers, Detector, Latch, PageContext, StorageProbe, TriggerRegistry};
use crate::host::{
    DispatchOutcome, FileHostStorage, HostDispatcher, HostResult, HostSession, HostStorage,
    PermissionFlow, PushPlatform, RegistrationClient, TokenLifecycleManager, TokenStore,
    UserDialog,
};
use crate::logger::set_log_level;
use crate::shell::config::ShellConfig;
use crate::shell::LOGGER;

/// Both halves of the bridge wired together.
///
/// The page half ([`PageApi`] over a [`PageContext`]) and the host half
/// ([`HostDispatcher`]) talk only through the bridge channel, the same way a
/// real web view and its native shell do.
pub struct Shell {
    config: ShellConfig,
    page: Arc<PageApi>,
    host: HostEndpoint,
    dispatcher: HostDispatcher,
    manager: Arc<TokenLifecycleManager>,
    session: Arc<HostSession>,
    triggers: Mutex<Option<ArmedTriggers>>,
}

impl std::fmt::Debug for Shell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shell")
            .field("config", &self.config)
            .field("page", &self.page)
            .field("dispatcher", &self.dispatcher)
            .finish_non_exhaustive()
    }
}

pub struct ShellBuilder {
    config: ShellConfig,
    platform: Arc<dyn PushPlatform>,
    dialog: Arc<dyn UserDialog>,
    storage: Option<Arc<dyn HostStorage>>,
    page: Option<PageContext>,
    probe: Option<StorageProbe>,
    injector: Option<Arc<dyn PageInjector>>,
}

impl ShellBuilder {
    /// Host storage; defaults to [`FileHostStorage::from_env`].
    pub fn with_storage(mut self, storage: Arc<dyn HostStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// The page to watch; defaults to an in-memory page at `config.page_url`.
    pub fn with_page(mut self, page: PageContext) -> Self {
        self.page = Some(page);
        self
    }

    pub fn with_probe(mut self, probe: StorageProbe) -> Self {
        self.probe = Some(probe);
        self
    }

    /// How host callbacks reach the page, e.g. a [`ScriptInjector`] around a
    /// web view. Defaults to delivering straight into the in-process page.
    ///
    /// [`ScriptInjector`]: crate::bridge::ScriptInjector
    pub fn with_injector(mut self, injector: Arc<dyn PageInjector>) -> Self {
        self.injector = Some(injector);
        self
    }

    pub fn build(self) -> HostResult<Shell> {
        let config = self.config;
        set_log_level(config.log_level);

        let storage: Arc<dyn HostStorage> = match self.storage {
            Some(storage) => storage,
            None => Arc::new(FileHostStorage::from_env()?),
        };
        let registration =
            RegistrationClient::new(&config.registration_base_url, config.registration_route)?;

        let (endpoint, host) = bridge_channel();
        let page_context = self
            .page
            .unwrap_or_else(|| PageContext::in_memory(config.page_url.clone()));
        let detector = Arc::new(Detector::new(
            page_context,
            self.probe.unwrap_or_default(),
            Arc::new(Latch::new()),
            report_login_listener(endpoint.clone()),
        ));
        let page = Arc::new(PageApi::new(endpoint, detector));

        let injector: Arc<dyn PageInjector> = match self.injector {
            Some(injector) => injector,
            None => Arc::new(LoopbackInjector::new(&page)),
        };

        let session = Arc::new(HostSession::new());
        let manager = TokenLifecycleManager::new(
            self.platform,
            Arc::clone(&self.dialog),
            TokenStore::new(storage),
            injector,
            Arc::clone(&session),
        );
        let permission = Arc::new(PermissionFlow::new(self.dialog, Arc::clone(&manager)));
        let dispatcher = HostDispatcher::new(
            Arc::clone(&manager),
            permission,
            registration,
            Arc::clone(&session),
            config.platform.clone(),
            config.debug,
        );

        LOGGER.debug(format!(
            "Shell ready for {} (registration via {}/{})",
            config.page_url, config.registration_base_url, config.registration_route
        ));
        Ok(Shell {
            config,
            page,
            host,
            dispatcher,
            manager,
            session,
            triggers: Mutex::new(None),
        })
    }
}

impl Shell {
    pub fn builder(
        config: ShellConfig,
        platform: Arc<dyn PushPlatform>,
        dialog: Arc<dyn UserDialog>,
    ) -> ShellBuilder {
        ShellBuilder {
            config,
            platform,
            dialog,
            storage: None,
            page: None,
            probe: None,
            injector: None,
        }
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    pub fn page(&self) -> &Arc<PageApi> {
        &self.page
    }

    pub fn detector(&self) -> &Arc<Detector> {
        self.page.detector()
    }

    pub fn token_manager(&self) -> &Arc<TokenLifecycleManager> {
        &self.manager
    }

    pub fn session(&self) -> &HostSession {
        &self.session
    }

    pub fn login_detected(&self) -> bool {
        self.detector().latch().is_set()
    }

    /// Script to inject before the page's own content loads.
    pub fn injected_javascript(&self) -> String {
        bootstrap_script()
    }

    /// Arms the detection triggers for a freshly loaded page, replacing (and
    /// cancelling) any set armed earlier. Needs a tokio runtime.
    pub fn page_loaded(&self) {
        let armed = TriggerRegistry::with_schedule(&self.config.schedule)
            .arm(Arc::clone(self.detector()));
        if !armed.is_cancelled() {
            LOGGER.info(format!("Watching {} for a login", self.detector().page().location()));
        }
        *self.triggers.lock().unwrap() = Some(armed);
    }

    /// Whether detection triggers are still running.
    pub fn detection_active(&self) -> bool {
        self.triggers
            .lock()
            .unwrap()
            .as_ref()
            .is_some_and(|armed| !armed.is_cancelled())
    }

    /// Handles one raw `postMessage` payload. Never fails.
    pub async fn handle_page_message(&self, raw: &str) -> DispatchOutcome {
        self.dispatcher.handle_raw(raw).await
    }

    /// Drains queued page messages, including the ones posted while handling,
    /// in order.
    pub async fn process_pending(&self) -> Vec<DispatchOutcome> {
        let mut outcomes = Vec::new();
        while let Some(raw) = self.host.try_recv() {
            outcomes.push(self.dispatcher.handle_raw(&raw).await);
        }
        outcomes
    }

    /// Handles page messages one at a time until `shutdown` fires.
    pub async fn run(&self, shutdown: CancellationToken) {
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                raw = self.host.recv() => match raw {
                    Some(raw) => {
                        self.dispatcher.handle_raw(&raw).await;
                    }
                    None => break,
                },
            }
        }
        self.shutdown();
    }

    /// Stops detection and drops platform listeners.
    pub fn shutdown(&self) {
        if let Some(armed) = self.triggers.lock().unwrap().take() {
            armed.cancel();
        }
        self.manager.detach_listeners();
        LOGGER.debug("Shell shut down");
    }
}
