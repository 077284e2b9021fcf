// src/services/notifier.rs

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    common::error::AppError,
    models::crm::{AgentDetail, Lead},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub subject: String,
    pub body: String,
    pub from: String,
    pub recipients: Vec<String>,
}

/// O transporte de e-mail. Não há fila nem retry: uma tentativa por mensagem.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, notification: &Notification) -> Result<(), AppError>;
}

/// Transporte de desenvolvimento: escreve a mensagem no log em vez de enviar.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, notification: &Notification) -> Result<(), AppError> {
        tracing::info!(
            from = %notification.from,
            to = ?notification.recipients,
            subject = %notification.subject,
            "📧 {}",
            notification.body
        );
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct MailSettings {
    pub from_address: String,
    pub lead_notification_recipient: String,
}

/// Os avisos disparados depois das mutações.
///
/// Chamado só depois do commit. Falha de transporte vira `warn!` e não volta
/// para quem chamou: o lead/agente já está gravado e continua válido.
#[derive(Clone)]
pub struct Notifier {
    mailer: Arc<dyn Mailer>,
    settings: MailSettings,
}

impl Notifier {
    pub fn new(mailer: Arc<dyn Mailer>, settings: MailSettings) -> Self {
        Self { mailer, settings }
    }

    pub async fn lead_created(&self, lead: &Lead) {
        let notification = Notification {
            subject: "A lead has been created".to_string(),
            body: "Go to the site to see the new lead".to_string(),
            from: self.settings.from_address.clone(),
            recipients: vec![self.settings.lead_notification_recipient.clone()],
        };
        self.dispatch(notification, "lead_created", lead.id).await;
    }

    pub async fn agent_invited(&self, agent: &AgentDetail) {
        let notification = Notification {
            subject: "You are invited to be an agent".to_string(),
            body: "You were added as an agent on leadflow. Please come login to start working."
                .to_string(),
            from: self.settings.from_address.clone(),
            recipients: vec![agent.email.clone()],
        };
        self.dispatch(notification, "agent_invited", agent.id).await;
    }

    async fn dispatch(&self, notification: Notification, event: &str, subject_id: uuid::Uuid) {
        if let Err(e) = self.mailer.send(&notification).await {
            tracing::warn!(
                event,
                %subject_id,
                "⚠️ Falha ao enviar notificação (ignorada): {}",
                e
            );
        }
    }
}
