//! View-model behind the dashboard screen.
//!
//! Owns the form, the per-field errors, the expanded row and a cache of the
//! fetched client list. A create appends the returned record to the cache;
//! a delete invalidates the cache and refetches it.

mod form;

use tracing::{debug, info};

use crate::api::{ClientService, Result};
use crate::models::{Client, ClientId};
use crate::validation::{validate, FieldErrors};

pub use form::{ClientForm, FormField};

/// Client-side copy of the list endpoint's last answer
#[derive(Debug, Default)]
pub struct ClientCache {
    clients: Vec<Client>,
    loaded: bool,
    stale: bool,
}

impl ClientCache {
    pub fn clients(&self) -> &[Client] {
        &self.clients
    }

    /// True when the next read should go back to the server
    pub fn needs_fetch(&self) -> bool {
        !self.loaded || self.stale
    }

    pub fn replace(&mut self, clients: Vec<Client>) {
        self.clients = clients;
        self.loaded = true;
        self.stale = false;
    }

    pub fn append(&mut self, client: Client) {
        self.clients.push(client);
    }

    pub fn invalidate(&mut self) {
        self.stale = true;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Validation failed; errors are stored and nothing was sent
    Invalid,
    Created(Client),
}

pub struct Dashboard<S> {
    service: S,
    form: ClientForm,
    errors: FieldErrors,
    expanded: Option<usize>,
    cache: ClientCache,
}

impl<S: ClientService> Dashboard<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            form: ClientForm::default(),
            errors: FieldErrors::new(),
            expanded: None,
            cache: ClientCache::default(),
        }
    }

    pub fn form(&self) -> &ClientForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut ClientForm {
        &mut self.form
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn error_for(&self, field: FormField) -> Option<&'static str> {
        self.errors.get(&field).copied()
    }

    pub fn clients(&self) -> &[Client] {
        self.cache.clients()
    }

    #[cfg(test)]
    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn cache(&self) -> &ClientCache {
        &self.cache
    }

    pub fn expanded(&self) -> Option<usize> {
        self.expanded
    }

    /// Records whose status is falsy, in list order
    pub fn inactive_clients(&self) -> Vec<&Client> {
        self.cache.clients().iter().filter(|c| !c.is_active()).collect()
    }

    /// Expand `index`, or collapse it if it is already the expanded row
    pub fn toggle_expanded(&mut self, index: usize) {
        self.expanded = if self.expanded == Some(index) {
            None
        } else {
            Some(index)
        };
    }

    /// Fetch the list unconditionally
    pub async fn refresh(&mut self) -> Result<()> {
        let clients = self.service.list_clients().await?;
        debug!(count = clients.len(), "client cache refreshed");
        self.cache.replace(clients);
        if self.expanded.is_some_and(|i| i >= self.cache.clients().len()) {
            self.expanded = None;
        }
        Ok(())
    }

    /// Fetch the list only if it was never loaded or has been invalidated
    pub async fn ensure_fresh(&mut self) -> Result<()> {
        if self.cache.needs_fetch() {
            self.refresh().await?;
        }
        Ok(())
    }

    /// Validate the form and, if it passes, create the client.
    ///
    /// On success the returned record is appended to the cache and the form
    /// and errors are reset. On a remote failure the form is left as it was.
    pub async fn submit(&mut self) -> Result<SubmitOutcome> {
        let errors = validate(&self.form);
        if !errors.is_empty() {
            debug!(fields = errors.len(), "form rejected by validation");
            self.errors = errors;
            return Ok(SubmitOutcome::Invalid);
        }

        let created = self
            .service
            .create_client(&self.form.to_new_client())
            .await?;
        info!(id = %created.id, "client created");

        self.cache.append(created.clone());
        self.form = ClientForm::default();
        self.errors.clear();

        Ok(SubmitOutcome::Created(created))
    }

    /// Delete the client, then invalidate and refetch the list
    pub async fn delete(&mut self, id: &ClientId) -> Result<serde_json::Value> {
        let result = self.service.delete_client(id).await?;
        info!(%id, "client deleted");

        self.cache.invalidate();
        self.ensure_fresh().await?;

        Ok(result)
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{client, FakeService};
    use super::*;

    fn fill_valid(form: &mut ClientForm) {
        form.set(FormField::Name, "Ana");
        form.set(FormField::Email, "a@b.co");
        form.set(FormField::Phone, "11912345678");
        form.set(FormField::City, "Recife");
        form.set(FormField::State, "PE");
    }

    async fn loaded(clients: Vec<Client>) -> Dashboard<FakeService> {
        let mut dashboard = Dashboard::new(FakeService::with_clients(clients));
        dashboard.refresh().await.unwrap();
        dashboard
    }

    #[tokio::test]
    async fn inactive_view_filters_falsy_status() {
        let dashboard = loaded(vec![
            client(1, "Ana", true),
            client(2, "Bia", false),
            client(3, "Caio", true),
        ])
        .await;

        let inactive = dashboard.inactive_clients();
        assert_eq!(inactive.len(), 1);
        assert_eq!(inactive[0].id, ClientId::Number(2));
    }

    #[test]
    fn toggling_the_same_row_twice_collapses_it() {
        let mut dashboard = Dashboard::new(FakeService::default());
        dashboard.toggle_expanded(2);
        assert_eq!(dashboard.expanded(), Some(2));
        dashboard.toggle_expanded(2);
        assert_eq!(dashboard.expanded(), None);
    }

    #[test]
    fn toggling_another_row_moves_the_selection() {
        let mut dashboard = Dashboard::new(FakeService::default());
        dashboard.toggle_expanded(0);
        dashboard.toggle_expanded(3);
        assert_eq!(dashboard.expanded(), Some(3));
    }

    #[tokio::test]
    async fn invalid_submit_stores_errors_and_skips_api() {
        let mut dashboard = loaded(vec![]).await;
        dashboard.form_mut().set(FormField::Email, "not-an-email");

        let outcome = dashboard.submit().await.unwrap();

        assert_eq!(outcome, SubmitOutcome::Invalid);
        assert!(dashboard.error_for(FormField::Email).is_some());
        assert!(dashboard.error_for(FormField::Name).is_some());
        assert!(dashboard.error_for(FormField::Phone).is_some());
        assert!(dashboard.service.created.borrow().is_empty());
        assert_eq!(dashboard.form().email, "not-an-email");
    }

    #[tokio::test]
    async fn successful_create_appends_and_resets() {
        let mut dashboard = loaded(vec![client(1, "Bia", true)]).await;
        dashboard.form_mut().set(FormField::Email, "bad");
        dashboard.submit().await.unwrap();
        fill_valid(dashboard.form_mut());

        let outcome = dashboard.submit().await.unwrap();

        let SubmitOutcome::Created(created) = outcome else {
            panic!("expected a created record");
        };
        assert_eq!(dashboard.clients().len(), 2);
        assert!(dashboard.clients().contains(&created));
        assert_eq!(dashboard.form(), &ClientForm::default());
        assert!(dashboard.errors().is_empty());
        // optimistic append, no refetch
        assert_eq!(*dashboard.service.list_calls.borrow(), 1);
    }

    #[tokio::test]
    async fn create_sends_capitalized_payload_values() {
        let mut dashboard = loaded(vec![]).await;
        fill_valid(dashboard.form_mut());
        dashboard.form_mut().set(FormField::Number, "77");

        dashboard.submit().await.unwrap();

        let sent = dashboard.service.created.borrow();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].name, "Ana");
        assert_eq!(sent[0].phone, "(11) 91234-5678");
        assert_eq!(sent[0].number, Some(77));
        assert_eq!(sent[0].state, "PE");
    }

    #[tokio::test]
    async fn failed_create_keeps_form() {
        let mut dashboard = loaded(vec![]).await;
        fill_valid(dashboard.form_mut());
        *dashboard.service.fail.borrow_mut() = true;

        let err = dashboard.submit().await.unwrap_err();

        assert!(matches!(err, crate::api::ApiError::Status { .. }));
        assert_eq!(dashboard.form().name, "Ana");
        assert!(dashboard.clients().is_empty());
    }

    #[tokio::test]
    async fn delete_refetches_instead_of_mutating() {
        let mut dashboard = loaded(vec![client(1, "Ana", true), client(2, "Bia", true)]).await;
        assert_eq!(*dashboard.service.list_calls.borrow(), 1);

        dashboard.delete(&ClientId::Number(1)).await.unwrap();

        assert_eq!(*dashboard.service.list_calls.borrow(), 2);
        assert_eq!(dashboard.service.deleted.borrow().as_slice(), &[ClientId::Number(1)]);
        assert_eq!(dashboard.clients().len(), 1);
        assert_eq!(dashboard.clients()[0].name, "Bia");
        assert!(!dashboard.cache().needs_fetch());
    }

    #[tokio::test]
    async fn failed_delete_leaves_cache_fresh() {
        let mut dashboard = loaded(vec![client(1, "Ana", true)]).await;
        *dashboard.service.fail.borrow_mut() = true;

        assert!(dashboard.delete(&ClientId::Number(1)).await.is_err());
        assert!(!dashboard.cache().needs_fetch());
        assert_eq!(dashboard.clients().len(), 1);
    }

    #[tokio::test]
    async fn ensure_fresh_fetches_once() {
        let mut dashboard = Dashboard::new(FakeService::with_clients(vec![client(1, "Ana", true)]));
        assert!(dashboard.cache().needs_fetch());

        dashboard.ensure_fresh().await.unwrap();
        dashboard.ensure_fresh().await.unwrap();

        assert_eq!(*dashboard.service.list_calls.borrow(), 1);
        assert_eq!(dashboard.clients().len(), 1);
    }

    #[tokio::test]
    async fn refresh_drops_expansion_past_end_of_list() {
        let mut dashboard = loaded(vec![client(1, "Ana", true), client(2, "Bia", true)]).await;
        dashboard.toggle_expanded(1);
        dashboard.delete(&ClientId::Number(2)).await.unwrap();
        assert_eq!(dashboard.expanded(), None);
    }
}
