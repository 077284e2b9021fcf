// src/test_support.rs
//
// Dublês para os testes dos serviços: um store em memória com a mesma
// semântica de escopo e de ON DELETE SET NULL do Postgres, e um mailer que grava.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CrmStore, UserStore},
    models::{
        auth::{NewUser, User},
        crm::{
            Agent, AgentDetail, AgentProfile, Category, Lead, LeadFields, LeadFilter,
            Organization,
        },
        principal::{LeadScope, Principal},
    },
    services::{
        access::AccessService,
        agent_service::AgentService,
        auth::AuthService,
        category_service::CategoryService,
        lead_service::LeadService,
        notifier::{MailSettings, Mailer, Notification, Notifier},
    },
};

const TEST_BCRYPT_COST: u32 = 4;

// =============================================================================
//  STORE EM MEMÓRIA
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct MemoryState {
    pub users: Vec<User>,
    pub organizations: Vec<Organization>,
    pub agents: Vec<Agent>,
    pub categories: Vec<Category>,
    pub leads: Vec<Lead>,
}

impl MemoryState {
    fn ensure_unique(&self, username: &str, email: &str, except: Option<Uuid>) -> Result<(), AppError> {
        let others = self.users.iter().filter(|u| Some(u.id) != except);
        for user in others {
            if user.username == username {
                return Err(AppError::UsernameAlreadyExists);
            }
            if user.email == email {
                return Err(AppError::EmailAlreadyExists);
            }
        }
        Ok(())
    }

    fn push_user(&mut self, new_user: NewUser, is_organizer: bool, is_agent: bool) -> User {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: new_user.username,
            email: new_user.email,
            password_hash: new_user.password_hash,
            first_name: new_user.first_name,
            last_name: new_user.last_name,
            is_organizer,
            is_agent,
            created_at: now,
            updated_at: now,
        };
        self.users.push(user.clone());
        user
    }

    fn agent_detail(&self, agent: &Agent) -> AgentDetail {
        let user = self
            .users
            .iter()
            .find(|u| u.id == agent.user_id)
            .expect("agente sem usuário no store em memória");
        AgentDetail {
            id: agent.id,
            user_id: user.id,
            organization_id: agent.organization_id,
            username: user.username.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            created_at: agent.created_at,
        }
    }

    // FK de leads.agent_id / leads.category_id: referência inexistente é NotFound
    fn ensure_references(&self, agent_id: Option<Uuid>, category_id: Option<Uuid>) -> Result<(), AppError> {
        if let Some(id) = agent_id {
            if !self.agents.iter().any(|a| a.id == id) {
                return Err(AppError::NotFound);
            }
        }
        if let Some(id) = category_id {
            if !self.categories.iter().any(|c| c.id == id) {
                return Err(AppError::NotFound);
            }
        }
        Ok(())
    }

    fn scoped_lead_mut(&mut self, scope: &LeadScope, lead_id: Uuid) -> Option<&mut Lead> {
        self.leads
            .iter_mut()
            .find(|l| l.id == lead_id && scope.admits(l))
    }
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn snapshot(&self) -> MemoryState {
        self.state.lock().unwrap().clone()
    }

    pub fn user(&self, id: Uuid) -> User {
        self.snapshot()
            .users
            .into_iter()
            .find(|u| u.id == id)
            .expect("usuário não existe no store em memória")
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state.users.iter().find(|u| u.username == username).cloned())
    }

    async fn create_organizer(&self, new_user: NewUser) -> Result<(User, Organization), AppError> {
        let mut state = self.state.lock().unwrap();
        state.ensure_unique(&new_user.username, &new_user.email, None)?;

        let user = state.push_user(new_user, true, false);
        let organization = Organization {
            id: Uuid::new_v4(),
            owner_id: user.id,
            created_at: Utc::now(),
        };
        state.organizations.push(organization.clone());
        Ok((user, organization))
    }

    async fn find_organization_by_owner(
        &self,
        user_id: Uuid,
    ) -> Result<Option<Organization>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .organizations
            .iter()
            .find(|o| o.owner_id == user_id)
            .cloned())
    }

    async fn find_agent_by_user(&self, user_id: Uuid) -> Result<Option<Agent>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state.agents.iter().find(|a| a.user_id == user_id).cloned())
    }
}

#[async_trait]
impl CrmStore for MemoryStore {
    async fn list_leads(
        &self,
        scope: &LeadScope,
        filter: LeadFilter,
    ) -> Result<Vec<Lead>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .leads
            .iter()
            .filter(|l| scope.admits(l) && filter.matches(l))
            .cloned()
            .collect())
    }

    async fn find_lead(&self, scope: &LeadScope, lead_id: Uuid) -> Result<Option<Lead>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .leads
            .iter()
            .find(|l| l.id == lead_id && scope.admits(l))
            .cloned())
    }

    async fn insert_lead(
        &self,
        organization_id: Uuid,
        fields: &LeadFields,
    ) -> Result<Lead, AppError> {
        let mut state = self.state.lock().unwrap();
        state.ensure_references(fields.agent_id, fields.category_id)?;
        let lead = Lead {
            id: Uuid::new_v4(),
            organization_id,
            agent_id: fields.agent_id,
            category_id: fields.category_id,
            first_name: fields.first_name.clone(),
            last_name: fields.last_name.clone(),
            age: fields.age,
            phone_number: fields.phone_number.clone(),
            email: fields.email.clone(),
            description: fields.description.clone(),
            date_added: Utc::now(),
        };
        state.leads.push(lead.clone());
        Ok(lead)
    }

    async fn update_lead(
        &self,
        scope: &LeadScope,
        lead_id: Uuid,
        fields: &LeadFields,
    ) -> Result<Option<Lead>, AppError> {
        let mut state = self.state.lock().unwrap();
        state.ensure_references(fields.agent_id, fields.category_id)?;
        Ok(state.scoped_lead_mut(scope, lead_id).map(|lead| {
            lead.agent_id = fields.agent_id;
            lead.category_id = fields.category_id;
            lead.first_name = fields.first_name.clone();
            lead.last_name = fields.last_name.clone();
            lead.age = fields.age;
            lead.phone_number = fields.phone_number.clone();
            lead.email = fields.email.clone();
            lead.description = fields.description.clone();
            lead.clone()
        }))
    }

    async fn delete_lead(&self, scope: &LeadScope, lead_id: Uuid) -> Result<bool, AppError> {
        let mut state = self.state.lock().unwrap();
        let before = state.leads.len();
        state.leads.retain(|l| !(l.id == lead_id && scope.admits(l)));
        Ok(state.leads.len() < before)
    }

    async fn set_lead_agent(
        &self,
        scope: &LeadScope,
        lead_id: Uuid,
        agent_id: Option<Uuid>,
    ) -> Result<Option<Lead>, AppError> {
        let mut state = self.state.lock().unwrap();
        state.ensure_references(agent_id, None)?;
        Ok(state.scoped_lead_mut(scope, lead_id).map(|lead| {
            lead.agent_id = agent_id;
            lead.clone()
        }))
    }

    async fn set_lead_category(
        &self,
        scope: &LeadScope,
        lead_id: Uuid,
        category_id: Option<Uuid>,
    ) -> Result<Option<Lead>, AppError> {
        let mut state = self.state.lock().unwrap();
        state.ensure_references(None, category_id)?;
        Ok(state.scoped_lead_mut(scope, lead_id).map(|lead| {
            lead.category_id = category_id;
            lead.clone()
        }))
    }

    async fn list_agents(&self, organization_id: Uuid) -> Result<Vec<AgentDetail>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .agents
            .iter()
            .filter(|a| a.organization_id == organization_id)
            .map(|a| state.agent_detail(a))
            .collect())
    }

    async fn find_agent(
        &self,
        organization_id: Uuid,
        agent_id: Uuid,
    ) -> Result<Option<AgentDetail>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .agents
            .iter()
            .find(|a| a.id == agent_id && a.organization_id == organization_id)
            .map(|a| state.agent_detail(a)))
    }

    async fn create_agent_account(
        &self,
        organization_id: Uuid,
        new_user: NewUser,
    ) -> Result<AgentDetail, AppError> {
        let mut state = self.state.lock().unwrap();
        // valida tudo antes de escrever: ou as duas linhas entram, ou nenhuma
        state.ensure_unique(&new_user.username, &new_user.email, None)?;

        let user = state.push_user(new_user, false, true);
        let agent = Agent {
            id: Uuid::new_v4(),
            user_id: user.id,
            organization_id,
            created_at: Utc::now(),
        };
        state.agents.push(agent.clone());
        Ok(state.agent_detail(&agent))
    }

    async fn update_agent_profile(
        &self,
        organization_id: Uuid,
        agent_id: Uuid,
        profile: &AgentProfile,
    ) -> Result<Option<AgentDetail>, AppError> {
        let mut state = self.state.lock().unwrap();
        let Some(agent) = state
            .agents
            .iter()
            .find(|a| a.id == agent_id && a.organization_id == organization_id)
            .cloned()
        else {
            return Ok(None);
        };
        state.ensure_unique(&profile.username, &profile.email, Some(agent.user_id))?;

        if let Some(user) = state.users.iter_mut().find(|u| u.id == agent.user_id) {
            user.username = profile.username.clone();
            user.email = profile.email.clone();
            user.first_name = profile.first_name.clone();
            user.last_name = profile.last_name.clone();
            user.updated_at = Utc::now();
        }
        Ok(Some(state.agent_detail(&agent)))
    }

    async fn delete_agent(&self, organization_id: Uuid, agent_id: Uuid) -> Result<bool, AppError> {
        let mut state = self.state.lock().unwrap();
        let before = state.agents.len();
        state
            .agents
            .retain(|a| !(a.id == agent_id && a.organization_id == organization_id));
        if state.agents.len() == before {
            return Ok(false);
        }
        // ON DELETE SET NULL
        for lead in state.leads.iter_mut().filter(|l| l.agent_id == Some(agent_id)) {
            lead.agent_id = None;
        }
        Ok(true)
    }

    async fn list_categories(&self, organization_id: Uuid) -> Result<Vec<Category>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .categories
            .iter()
            .filter(|c| c.organization_id == organization_id)
            .cloned()
            .collect())
    }

    async fn find_category(
        &self,
        organization_id: Uuid,
        category_id: Uuid,
    ) -> Result<Option<Category>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .categories
            .iter()
            .find(|c| c.id == category_id && c.organization_id == organization_id)
            .cloned())
    }

    async fn insert_category(
        &self,
        organization_id: Uuid,
        name: &str,
    ) -> Result<Category, AppError> {
        let mut state = self.state.lock().unwrap();
        let category = Category {
            id: Uuid::new_v4(),
            organization_id,
            name: name.to_string(),
            created_at: Utc::now(),
        };
        state.categories.push(category.clone());
        Ok(category)
    }

    async fn rename_category(
        &self,
        organization_id: Uuid,
        category_id: Uuid,
        name: &str,
    ) -> Result<Option<Category>, AppError> {
        let mut state = self.state.lock().unwrap();
        Ok(state
            .categories
            .iter_mut()
            .find(|c| c.id == category_id && c.organization_id == organization_id)
            .map(|c| {
                c.name = name.to_string();
                c.clone()
            }))
    }

    async fn delete_category(
        &self,
        organization_id: Uuid,
        category_id: Uuid,
    ) -> Result<bool, AppError> {
        let mut state = self.state.lock().unwrap();
        let before = state.categories.len();
        state
            .categories
            .retain(|c| !(c.id == category_id && c.organization_id == organization_id));
        if state.categories.len() == before {
            return Ok(false);
        }
        for lead in state
            .leads
            .iter_mut()
            .filter(|l| l.category_id == Some(category_id))
        {
            lead.category_id = None;
        }
        Ok(true)
    }
}

// =============================================================================
//  MAILER QUE GRAVA
// =============================================================================

#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<Notification>>,
    attempts: AtomicUsize,
    fail: bool,
}

impl RecordingMailer {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
        self.attempts.store(0, Ordering::SeqCst);
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, notification: &Notification) -> Result<(), AppError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(AppError::InternalServerError(anyhow::anyhow!("connection refused")));
        }
        self.sent.lock().unwrap().push(notification.clone());
        Ok(())
    }
}

// =============================================================================
//  FIXTURES
// =============================================================================

pub fn test_mail_settings() -> MailSettings {
    MailSettings {
        from_address: "admin@test.local".into(),
        lead_notification_recipient: "ops@test.local".into(),
    }
}

pub fn sample_lead_fields() -> LeadFields {
    LeadFields {
        first_name: "Jane".into(),
        last_name: "Doe".into(),
        age: 30,
        phone_number: "555-0100".into(),
        email: "jane@x.com".into(),
        description: "interested".into(),
        agent_id: None,
        category_id: None,
    }
}

pub fn sample_lead() -> Lead {
    let fields = sample_lead_fields();
    Lead {
        id: Uuid::new_v4(),
        organization_id: Uuid::new_v4(),
        agent_id: None,
        category_id: None,
        first_name: fields.first_name,
        last_name: fields.last_name,
        age: fields.age,
        phone_number: fields.phone_number,
        email: fields.email,
        description: fields.description,
        date_added: Utc::now(),
    }
}

pub fn agent_profile(username: &str) -> AgentProfile {
    AgentProfile {
        username: username.to_string(),
        email: format!("{}@test.local", username),
        first_name: String::new(),
        last_name: String::new(),
    }
}

/// Todos os serviços montados sobre o mesmo store em memória.
pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub mailer: Arc<RecordingMailer>,
    pub access: AccessService,
    pub auth: AuthService,
    pub leads: LeadService,
    pub agents: AgentService,
    pub categories: CategoryService,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_mailer(RecordingMailer::default())
    }

    pub fn with_failing_mailer() -> Self {
        Self::with_mailer(RecordingMailer::failing())
    }

    fn with_mailer(mailer: RecordingMailer) -> Self {
        let store = Arc::new(MemoryStore::default());
        let mailer = Arc::new(mailer);
        let notifier = Notifier::new(mailer.clone(), test_mail_settings());

        Self {
            access: AccessService::new(store.clone()),
            auth: AuthService::new(
                store.clone(),
                "test-secret".into(),
                Duration::hours(1),
                TEST_BCRYPT_COST,
            ),
            leads: LeadService::new(store.clone(), notifier.clone()),
            agents: AgentService::new(store.clone(), notifier, TEST_BCRYPT_COST),
            categories: CategoryService::new(store.clone()),
            store,
            mailer,
        }
    }

    /// Organizador + organização, sem passar pelo bcrypt.
    pub async fn signup(&self, username: &str) -> (User, Organization) {
        self.store
            .create_organizer(NewUser {
                username: username.to_string(),
                email: format!("{}@test.local", username),
                password_hash: "x".into(),
                first_name: String::new(),
                last_name: String::new(),
            })
            .await
            .unwrap()
    }

    pub async fn organizer(&self, username: &str) -> Principal {
        let (user, _) = self.signup(username).await;
        self.access.resolve(&user).await.unwrap()
    }

    pub async fn agent_of(&self, organizer: &Principal, username: &str) -> (AgentDetail, Principal) {
        let agent = self
            .agents
            .create_agent(organizer, agent_profile(username))
            .await
            .unwrap();
        let principal = self
            .access
            .resolve(&self.store.user(agent.user_id))
            .await
            .unwrap();
        (agent, principal)
    }
}
