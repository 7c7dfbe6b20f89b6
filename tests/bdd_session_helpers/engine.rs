//! A scripted container engine that records every call it receives.

use std::sync::Mutex;

use bollard::errors::Error as BollardError;
use bollard::models::{ContainerCreateBody, ContainerCreateResponse};
use bollard::query_parameters::CreateContainerOptions;
use deskpod::engine::{
    ContainerCreator, ContainerLifecycleClient, CreateContainerFuture, EngineUnitFuture,
    ImageReference, InterruptSender, WaitContainerFuture,
};

pub(crate) const CONTAINER_ID: &str = "5e55i0n";

/// How the wait call behaves.
#[derive(Debug, Clone, Copy)]
pub(crate) enum WaitBehaviour {
    /// Never completes; only an interrupt ends the wait.
    Pending,
    /// Completes with the given exit status.
    Exits(i64),
}

/// How the stop call behaves.
#[derive(Debug, Clone, Copy)]
pub(crate) enum StopBehaviour {
    Succeeds,
    Fails,
    /// Never completes; the operator interrupts again while it is pending.
    HangsUntilInterrupted,
}

/// Engine double driven by scenario settings.
pub(crate) struct ScriptedEngine {
    pub(crate) image_missing: bool,
    /// Interrupts the operator sends while the pull is in flight.
    pub(crate) pull_interrupts: usize,
    pub(crate) operator: Option<InterruptSender>,
    pub(crate) wait: WaitBehaviour,
    pub(crate) stop: StopBehaviour,
    pub(crate) calls: Mutex<Vec<String>>,
    pub(crate) created: Mutex<Option<ContainerCreateBody>>,
}

impl ScriptedEngine {
    pub(crate) fn new(image_missing: bool, wait: WaitBehaviour, stop: StopBehaviour) -> Self {
        Self {
            image_missing,
            pull_interrupts: 0,
            operator: None,
            wait,
            stop,
            calls: Mutex::new(Vec::new()),
            created: Mutex::new(None),
        }
    }

    /// Let the engine press Ctrl-C on the operator's behalf.
    pub(crate) fn with_operator(mut self, operator: InterruptSender, pull_interrupts: usize) -> Self {
        self.operator = Some(operator);
        self.pull_interrupts = pull_interrupts;
        self
    }

    fn press_ctrl_c(&self, times: usize) {
        if let Some(operator) = &self.operator {
            for _ in 0..times {
                assert!(operator.interrupt(), "interrupt channel should be open");
            }
        }
    }

    fn record(&self, call: &str) {
        self.calls
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(String::from(call));
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn created_body(&self) -> Option<ContainerCreateBody> {
        self.created
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

fn server_error(status_code: u16, message: &str) -> BollardError {
    BollardError::DockerResponseServerError {
        status_code,
        message: String::from(message),
    }
}

impl ContainerCreator for ScriptedEngine {
    fn create_container(
        &self,
        _options: Option<CreateContainerOptions>,
        config: ContainerCreateBody,
    ) -> CreateContainerFuture<'_> {
        self.record("create");
        *self
            .created
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(config);
        Box::pin(async {
            Ok(ContainerCreateResponse {
                id: String::from(CONTAINER_ID),
                warnings: vec![],
            })
        })
    }
}

impl ContainerLifecycleClient for ScriptedEngine {
    fn pull_image(&self, _image: &ImageReference) -> EngineUnitFuture<'_> {
        self.record("pull");
        if self.pull_interrupts > 0 {
            self.press_ctrl_c(self.pull_interrupts);
            return Box::pin(std::future::pending::<Result<(), BollardError>>());
        }
        let missing = self.image_missing;
        Box::pin(async move {
            if missing {
                Err(server_error(404, "manifest unknown"))
            } else {
                Ok(())
            }
        })
    }

    fn start_container(&self, _container_id: &str) -> EngineUnitFuture<'_> {
        self.record("start");
        Box::pin(async { Ok(()) })
    }

    fn wait_container(&self, _container_id: &str) -> WaitContainerFuture<'_> {
        self.record("wait");
        match self.wait {
            WaitBehaviour::Pending => Box::pin(std::future::pending::<Result<i64, BollardError>>()),
            WaitBehaviour::Exits(code) => Box::pin(async move { Ok(code) }),
        }
    }

    fn stop_container(&self, _container_id: &str) -> EngineUnitFuture<'_> {
        self.record("stop");
        match self.stop {
            StopBehaviour::Succeeds => Box::pin(async { Ok(()) }),
            StopBehaviour::Fails => {
                Box::pin(async { Err(server_error(500, "cannot stop container")) })
            }
            StopBehaviour::HangsUntilInterrupted => {
                self.press_ctrl_c(1);
                Box::pin(std::future::pending::<Result<(), BollardError>>())
            }
        }
    }

    fn kill_container(&self, _container_id: &str) -> EngineUnitFuture<'_> {
        self.record("kill");
        Box::pin(async { Ok(()) })
    }

    fn remove_container(&self, _container_id: &str, force: bool) -> EngineUnitFuture<'_> {
        self.record(if force { "remove(force)" } else { "remove" });
        Box::pin(async { Ok(()) })
    }
}
