//! Mock implementation of the container API for testing
//!
//! This mock serves seeded entity listings, records every mutation call,
//! and can be configured to fail mutations for specific entity ids so
//! tests can exercise the log-and-continue batch semantics.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tagman_client_core::api::ContainerApi;
use tagman_client_core::error::{Error, Result};
use tagman_client_core::{Tag, Trigger, Variable};

/// A mutation observed by the mock, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    CreateTag(String),
    UpdateTag(String),
    DeleteTag(String),
    CreateTrigger(String),
    DeleteTrigger(String),
    CreateVariable(String),
    DeleteVariable(String),
}

#[derive(Default)]
struct MockState {
    containers: HashMap<String, String>,
    tags: Vec<Tag>,
    triggers: Vec<Trigger>,
    variables: Vec<Variable>,
    failing_ids: HashSet<String>,
    fail_listings: bool,
    calls: Vec<RecordedCall>,
    next_id: u64,
}

/// Mock container client backed by in-memory entity lists.
///
/// # Examples
///
/// ```rust,no_run
/// use tagman_test_utils::{MockContainerClient, TagBuilder};
/// use tagman_client_core::api::ContainerApi;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mock = MockContainerClient::new();
/// mock.seed_container("greetings", "456");
/// mock.seed_tag(TagBuilder::new("1", "pageview").build());
///
/// let id = mock.find_container_id("123", "greetings").await?;
/// assert_eq!(id.as_deref(), Some("456"));
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Default)]
pub struct MockContainerClient {
    state: Arc<Mutex<MockState>>,
}

impl MockContainerClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a container name → id mapping.
    pub fn seed_container(&self, name: &str, container_id: &str) {
        let mut state = self.state.lock().unwrap();
        state.containers.insert(name.to_string(), container_id.to_string());
    }

    pub fn seed_tag(&self, tag: Tag) {
        self.state.lock().unwrap().tags.push(tag);
    }

    pub fn seed_trigger(&self, trigger: Trigger) {
        self.state.lock().unwrap().triggers.push(trigger);
    }

    pub fn seed_variable(&self, variable: Variable) {
        self.state.lock().unwrap().variables.push(variable);
    }

    /// Make every mutation touching the given entity id fail with an API
    /// error.
    pub fn fail_mutations_for(&self, entity_id: &str) {
        self.state.lock().unwrap().failing_ids.insert(entity_id.to_string());
    }

    /// Make all listing calls fail with an API error.
    pub fn fail_listings(&self) {
        self.state.lock().unwrap().fail_listings = true;
    }

    /// Mutations observed so far, in call order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Tags currently held by the mock container.
    pub fn tags(&self) -> Vec<Tag> {
        self.state.lock().unwrap().tags.clone()
    }

    /// Triggers currently held by the mock container.
    pub fn triggers(&self) -> Vec<Trigger> {
        self.state.lock().unwrap().triggers.clone()
    }

    /// Variables currently held by the mock container.
    pub fn variables(&self) -> Vec<Variable> {
        self.state.lock().unwrap().variables.clone()
    }

    fn check_mutation(state: &MockState, entity_id: &str, operation: &str) -> Result<()> {
        if state.failing_ids.contains(entity_id) {
            return Err(Error::api(operation, "injected failure"));
        }
        Ok(())
    }

    fn fresh_id(state: &mut MockState) -> String {
        state.next_id += 1;
        format!("mock-{}", state.next_id)
    }
}

#[async_trait]
impl ContainerApi for MockContainerClient {
    async fn find_container_id(
        &self,
        _account_id: &str,
        container_name: &str,
    ) -> Result<Option<String>> {
        let state = self.state.lock().unwrap();
        Ok(state.containers.get(container_name).cloned())
    }

    async fn list_tags(&self, _account_id: &str, _container_id: &str) -> Result<Vec<Tag>> {
        let state = self.state.lock().unwrap();
        if state.fail_listings {
            return Err(Error::api("list tags", "injected failure"));
        }
        Ok(state.tags.clone())
    }

    async fn list_triggers(&self, _account_id: &str, _container_id: &str) -> Result<Vec<Trigger>> {
        let state = self.state.lock().unwrap();
        if state.fail_listings {
            return Err(Error::api("list triggers", "injected failure"));
        }
        Ok(state.triggers.clone())
    }

    async fn list_variables(
        &self,
        _account_id: &str,
        _container_id: &str,
    ) -> Result<Vec<Variable>> {
        let state = self.state.lock().unwrap();
        if state.fail_listings {
            return Err(Error::api("list variables", "injected failure"));
        }
        Ok(state.variables.clone())
    }

    async fn create_tag(&self, _account_id: &str, _container_id: &str, tag: &Tag) -> Result<Tag> {
        let mut state = self.state.lock().unwrap();
        let mut created = tag.clone();
        if created.tag_id.is_empty() {
            created.tag_id = Self::fresh_id(&mut state);
        }
        Self::check_mutation(&state, &created.tag_id, "create tag")?;
        state.calls.push(RecordedCall::CreateTag(created.tag_id.clone()));
        state.tags.push(created.clone());
        Ok(created)
    }

    async fn update_tag(&self, _account_id: &str, _container_id: &str, tag: &Tag) -> Result<Tag> {
        let mut state = self.state.lock().unwrap();
        Self::check_mutation(&state, &tag.tag_id, "update tag")?;
        state.calls.push(RecordedCall::UpdateTag(tag.tag_id.clone()));
        if let Some(existing) = state.tags.iter_mut().find(|t| t.tag_id == tag.tag_id) {
            *existing = tag.clone();
        }
        Ok(tag.clone())
    }

    async fn delete_tag(
        &self,
        _account_id: &str,
        _container_id: &str,
        tag_id: &str,
    ) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        Self::check_mutation(&state, tag_id, "delete tag")?;
        state.calls.push(RecordedCall::DeleteTag(tag_id.to_string()));
        state.tags.retain(|t| t.tag_id != tag_id);
        Ok(())
    }

    async fn create_trigger(
        &self,
        _account_id: &str,
        _container_id: &str,
        trigger: &Trigger,
    ) -> Result<Trigger> {
        let mut state = self.state.lock().unwrap();
        let mut created = trigger.clone();
        if created.trigger_id.is_empty() {
            created.trigger_id = Self::fresh_id(&mut state);
        }
        Self::check_mutation(&state, &created.trigger_id, "create trigger")?;
        state
            .calls
            .push(RecordedCall::CreateTrigger(created.trigger_id.clone()));
        state.triggers.push(created.clone());
        Ok(created)
    }

    async fn delete_trigger(
        &self,
        _account_id: &str,
        _container_id: &str,
        trigger_id: &str,
    ) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        Self::check_mutation(&state, trigger_id, "delete trigger")?;
        state
            .calls
            .push(RecordedCall::DeleteTrigger(trigger_id.to_string()));
        state.triggers.retain(|t| t.trigger_id != trigger_id);
        Ok(())
    }

    async fn create_variable(
        &self,
        _account_id: &str,
        _container_id: &str,
        variable: &Variable,
    ) -> Result<Variable> {
        let mut state = self.state.lock().unwrap();
        let mut created = variable.clone();
        if created.variable_id.is_empty() {
            created.variable_id = Self::fresh_id(&mut state);
        }
        Self::check_mutation(&state, &created.variable_id, "create variable")?;
        state
            .calls
            .push(RecordedCall::CreateVariable(created.variable_id.clone()));
        state.variables.push(created.clone());
        Ok(created)
    }

    async fn delete_variable(
        &self,
        _account_id: &str,
        _container_id: &str,
        variable_id: &str,
    ) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        Self::check_mutation(&state, variable_id, "delete variable")?;
        state
            .calls
            .push(RecordedCall::DeleteVariable(variable_id.to_string()));
        state.variables.retain(|v| v.variable_id != variable_id);
        Ok(())
    }
}
