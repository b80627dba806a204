//! Single-writer command actor
//!
//! Every mutating request is sent to one task that applies commands in
//! arrival order. Reads do not go through the actor; they take the store's
//! read lock directly.
//!
//! ```text
//!   HTTP handlers ──► CommandHandle (Clone)
//!                          │
//!                          │ mpsc::channel (bounded)
//!                          ▼
//!                    CommandActor (single task)
//!                          │
//!                          ▼
//!                    CreditService ──► LedgerStore (write lock)
//! ```

use crate::service::{CreditService, PurchaseRequest};
use crate::{Error, Result};
use ledger_core::{
    CreditBalance, EmissionsProfile, EmissionsReport, NewProject, OrganizationId, Project,
    ProjectId, Transaction,
};
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

/// Command sent to the actor
#[derive(Debug)]
pub enum ServiceCommand {
    /// Upload a project
    RegisterProject {
        /// Project data
        data: NewProject,
        /// Reply channel
        response: oneshot::Sender<Result<Project>>,
    },

    /// Send a project for verification
    SubmitProject {
        /// Project
        id: ProjectId,
        /// Reply channel
        response: oneshot::Sender<Result<Project>>,
    },

    /// Approve a project
    ApproveProject {
        /// Project
        id: ProjectId,
        /// Hectares accepted by the verifier
        verified_hectares: Decimal,
        /// Reply channel
        response: oneshot::Sender<Result<Project>>,
    },

    /// Reject a project
    RejectProject {
        /// Project
        id: ProjectId,
        /// Reason shown to the NGO
        reason: String,
        /// Reply channel
        response: oneshot::Sender<Result<Project>>,
    },

    /// Buy credits
    Purchase {
        /// Order
        request: PurchaseRequest,
        /// Reply channel
        response: oneshot::Sender<Result<Transaction>>,
    },

    /// Retire credits
    Retire {
        /// Retiring organization
        organization: OrganizationId,
        /// Credits to retire
        amount: u64,
        /// Reply channel
        response: oneshot::Sender<Result<CreditBalance>>,
    },

    /// Report emissions
    RecordEmissions {
        /// Reporting organization
        organization: OrganizationId,
        /// Emissions figures
        report: EmissionsReport,
        /// Reply channel
        response: oneshot::Sender<Result<EmissionsProfile>>,
    },

    /// Stop the actor
    Shutdown,
}

/// Actor that applies commands one at a time
#[derive(Debug)]
pub struct CommandActor {
    service: Arc<CreditService>,
    mailbox: mpsc::Receiver<ServiceCommand>,
}

impl CommandActor {
    /// Create new actor
    pub fn new(service: Arc<CreditService>, mailbox: mpsc::Receiver<ServiceCommand>) -> Self {
        Self { service, mailbox }
    }

    /// Run until shutdown or until every handle is dropped
    pub async fn run(mut self) {
        while let Some(command) = self.mailbox.recv().await {
            if let ServiceCommand::Shutdown = command {
                tracing::info!("Command actor shutting down");
                break;
            }
            self.handle(command);
        }
    }

    fn handle(&self, command: ServiceCommand) {
        // A dropped receiver means the caller went away; the command still applied.
        match command {
            ServiceCommand::RegisterProject { data, response } => {
                let _ = response.send(self.service.register_project(data));
            }

            ServiceCommand::SubmitProject { id, response } => {
                let _ = response.send(self.service.submit_project(id));
            }

            ServiceCommand::ApproveProject {
                id,
                verified_hectares,
                response,
            } => {
                let _ = response.send(self.service.approve_project(id, verified_hectares));
            }

            ServiceCommand::RejectProject {
                id,
                reason,
                response,
            } => {
                let _ = response.send(self.service.reject_project(id, reason));
            }

            ServiceCommand::Purchase { request, response } => {
                let _ = response.send(self.service.purchase_credits(request));
            }

            ServiceCommand::Retire {
                organization,
                amount,
                response,
            } => {
                let _ = response.send(self.service.retire_credits(&organization, amount));
            }

            ServiceCommand::RecordEmissions {
                organization,
                report,
                response,
            } => {
                let _ = response.send(self.service.record_emissions(&organization, report));
            }

            ServiceCommand::Shutdown => {
                // Handled in run loop
            }
        }
    }
}

/// Handle for sending commands to the actor
#[derive(Debug, Clone)]
pub struct CommandHandle {
    sender: mpsc::Sender<ServiceCommand>,
}

impl CommandHandle {
    /// Create new handle
    pub fn new(sender: mpsc::Sender<ServiceCommand>) -> Self {
        Self { sender }
    }

    /// Upload a project
    pub async fn register_project(&self, data: NewProject) -> Result<Project> {
        self.request(|response| ServiceCommand::RegisterProject { data, response })
            .await
    }

    /// Send a project for verification
    pub async fn submit_project(&self, id: ProjectId) -> Result<Project> {
        self.request(|response| ServiceCommand::SubmitProject { id, response })
            .await
    }

    /// Approve a project
    pub async fn approve_project(&self, id: ProjectId, verified_hectares: Decimal) -> Result<Project> {
        self.request(|response| ServiceCommand::ApproveProject {
            id,
            verified_hectares,
            response,
        })
        .await
    }

    /// Reject a project
    pub async fn reject_project(&self, id: ProjectId, reason: String) -> Result<Project> {
        self.request(|response| ServiceCommand::RejectProject {
            id,
            reason,
            response,
        })
        .await
    }

    /// Buy credits
    pub async fn purchase_credits(&self, request: PurchaseRequest) -> Result<Transaction> {
        self.request(|response| ServiceCommand::Purchase { request, response })
            .await
    }

    /// Retire credits
    pub async fn retire_credits(
        &self,
        organization: OrganizationId,
        amount: u64,
    ) -> Result<CreditBalance> {
        self.request(|response| ServiceCommand::Retire {
            organization,
            amount,
            response,
        })
        .await
    }

    /// Report emissions
    pub async fn record_emissions(
        &self,
        organization: OrganizationId,
        report: EmissionsReport,
    ) -> Result<EmissionsProfile> {
        self.request(|response| ServiceCommand::RecordEmissions {
            organization,
            report,
            response,
        })
        .await
    }

    /// Stop the actor
    pub async fn shutdown(&self) -> Result<()> {
        self.sender
            .send(ServiceCommand::Shutdown)
            .await
            .map_err(|_| Error::Concurrency("Actor mailbox closed".to_string()))
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<Result<T>>) -> ServiceCommand,
    ) -> Result<T> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(command(tx))
            .await
            .map_err(|_| Error::Concurrency("Actor mailbox closed".to_string()))?;

        rx.await
            .map_err(|_| Error::Concurrency("Response channel closed".to_string()))?
    }
}

/// Spawn the command actor with a bounded mailbox
pub fn spawn_command_actor(service: Arc<CreditService>, mailbox_capacity: usize) -> CommandHandle {
    let (tx, rx) = mpsc::channel(mailbox_capacity);
    let actor = CommandActor::new(service, rx);

    tokio::spawn(async move {
        actor.run().await;
    });

    CommandHandle::new(tx)
}
