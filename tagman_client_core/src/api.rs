//! Abstract container API capability
//!
//! The analyzer and planner are pure; everything that talks to the remote
//! service goes through this trait. [`crate::service::TagManagerService`]
//! is the HTTP implementation; tests substitute a mock.

use crate::entities::{Tag, Trigger, Variable};
use crate::error::Result;
use async_trait::async_trait;

/// CRUD operations on the entities of one account/container pair.
#[async_trait]
pub trait ContainerApi: Send + Sync {
    /// Resolve a container name to its id, or `None` when no container in
    /// the account carries that name.
    async fn find_container_id(
        &self,
        account_id: &str,
        container_name: &str,
    ) -> Result<Option<String>>;

    async fn list_tags(&self, account_id: &str, container_id: &str) -> Result<Vec<Tag>>;
    async fn list_triggers(&self, account_id: &str, container_id: &str) -> Result<Vec<Trigger>>;
    async fn list_variables(&self, account_id: &str, container_id: &str) -> Result<Vec<Variable>>;

    async fn create_tag(&self, account_id: &str, container_id: &str, tag: &Tag) -> Result<Tag>;
    async fn update_tag(&self, account_id: &str, container_id: &str, tag: &Tag) -> Result<Tag>;
    async fn delete_tag(&self, account_id: &str, container_id: &str, tag_id: &str) -> Result<()>;

    async fn create_trigger(
        &self,
        account_id: &str,
        container_id: &str,
        trigger: &Trigger,
    ) -> Result<Trigger>;
    async fn delete_trigger(
        &self,
        account_id: &str,
        container_id: &str,
        trigger_id: &str,
    ) -> Result<()>;

    async fn create_variable(
        &self,
        account_id: &str,
        container_id: &str,
        variable: &Variable,
    ) -> Result<Variable>;
    async fn delete_variable(
        &self,
        account_id: &str,
        container_id: &str,
        variable_id: &str,
    ) -> Result<()>;
}
