//! Form session lifecycle tests

use async_trait::async_trait;
use lead_form_engine::{
    BackendError, Connectivity, EngineProfile, FieldAssignment, FieldValue, FormBackend,
    FormCatalog, FormNotice, FormSession, FormTarget, InMemoryFormBackend, LeadAck, LeadPayload,
    RetryAction, SessionError, SessionStatus, SubmitBlocked, SubmitOutcome,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;

const CATALOG: &str = r#"
fields:
  - id: f-first
    name: firstName
    dataType: text
    label: First name
    translations:
      es:
        label: Nombre
  - id: f-email
    name: email
    dataType: email
    label: Email
    defaultPlaceholder: you@example.com
  - id: f-consent
    name: consent
    dataType: checkbox
    label: I agree
  - id: f-topics
    name: topics
    dataType: extensible_list
    label: Topics
    defaultValidation:
      maxItems: 3
      itemLabel: Topic
  - id: f-size
    name: companySize
    dataType: radio
    label: Company size
    defaultValidation:
      options: ["1-10", "11-50", "51+"]
templates:
  - id: card
    assignments:
      - id: a-email
        fieldLibraryId: f-email
        isRequired: true
        order: "2"
        section: Contact
      - id: a-first
        fieldLibraryId: f-first
        isRequired: true
        order: "1"
        section: Contact
      - id: a-consent
        fieldLibraryId: f-consent
        order: "3"
      - id: a-topics
        fieldLibraryId: f-topics
        order: "4"
      - id: a-size
        fieldLibraryId: f-size
        order: "5"
      - id: a-orphan
        fieldLibraryId: f-deleted
        order: "0"
  - id: empty
    assignments: []
"#;

/// Backend double with scripted fetch and submit failures
struct FlakyBackend {
    inner: InMemoryFormBackend,
    fetch_failures: AtomicU32,
    fetch_not_found: AtomicBool,
    fetch_calls: AtomicU32,
    reject_submits: AtomicBool,
    submit_calls: AtomicU32,
}

impl FlakyBackend {
    fn new() -> Self {
        let catalog = FormCatalog::from_yaml_str(CATALOG).unwrap();
        Self {
            inner: InMemoryFormBackend::from_catalog(catalog).unwrap(),
            fetch_failures: AtomicU32::new(0),
            fetch_not_found: AtomicBool::new(false),
            fetch_calls: AtomicU32::new(0),
            reject_submits: AtomicBool::new(false),
            submit_calls: AtomicU32::new(0),
        }
    }

    fn failing_fetches(self, failures: u32) -> Self {
        self.fetch_failures.store(failures, Ordering::SeqCst);
        self
    }

    fn fetch_calls(&self) -> u32 {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    fn submit_calls(&self) -> u32 {
        self.submit_calls.load(Ordering::SeqCst)
    }
}

#[async_trait(?Send)]
impl FormBackend for FlakyBackend {
    async fn fetch_field_assignments(
        &self,
        form_template_id: &str,
    ) -> Result<Vec<FieldAssignment>, BackendError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if self.fetch_not_found.load(Ordering::SeqCst) {
            return Err(BackendError::NotFound(form_template_id.to_string()));
        }
        let remaining = self.fetch_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.fetch_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(BackendError::NetworkError("connection reset".to_string()));
        }
        self.inner.fetch_field_assignments(form_template_id).await
    }

    async fn submit_lead(&self, payload: &LeadPayload) -> Result<LeadAck, BackendError> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        if self.reject_submits.load(Ordering::SeqCst) {
            return Err(BackendError::Rejected("duplicate lead".to_string()));
        }
        self.inner.submit_lead(payload).await
    }
}

fn fast_retries() -> EngineProfile {
    EngineProfile::builder()
        .retry_on_load_failure(true)
        .retry_delay(Duration::from_millis(1))
        .array_defaults_to_blank_row(false)
        .build()
}

fn session(
    backend: &Arc<FlakyBackend>,
    template: &str,
    profile: EngineProfile,
    connectivity: &Connectivity,
) -> FormSession<FlakyBackend> {
    FormSession::new(
        Arc::clone(backend),
        FormTarget::new(template, "site-1"),
        profile,
        connectivity,
    )
}

fn fill_valid(session: &mut FormSession<FlakyBackend>) {
    session.set_value("firstName", "Jo").unwrap();
    session.set_value("email", "a@b.co").unwrap();
}

mod loading_tests {
    use super::*;

    #[tokio::test]
    async fn test_open_synthesizes_defaults_and_descriptors() {
        let backend = Arc::new(FlakyBackend::new());
        let connectivity = Connectivity::online();
        let mut session = session(&backend, "card", EngineProfile::simple(), &connectivity);
        assert_eq!(session.status(), SessionStatus::Idle);

        session.open().await.unwrap();
        assert_eq!(session.status(), SessionStatus::Ready);

        // The orphaned assignment is dropped silently
        let descriptors = session.descriptors();
        let names: Vec<_> = descriptors.iter().map(|d| d.field_name.as_str()).collect();
        assert_eq!(
            names,
            vec!["firstName", "email", "consent", "topics", "companySize"]
        );
        assert_eq!(session.values().len(), 5);
        assert_eq!(session.value("consent"), Some(&FieldValue::text("false")));
        assert_eq!(session.value("topics"), Some(&FieldValue::list([""])));

        let email = &descriptors[1];
        assert_eq!(email.resolved_label, "Email");
        assert_eq!(email.resolved_placeholder, "you@example.com");
        assert!(email.is_required);
        assert_eq!(email.section.as_deref(), Some("Contact"));
        assert_eq!(descriptors[3].max_items, Some(3));
        assert_eq!(descriptors[3].item_label.as_deref(), Some("Topic"));
        assert_eq!(descriptors[4].resolved_options, vec!["1-10", "11-50", "51+"]);

        let blueprint = session.blueprint().unwrap();
        assert_eq!(blueprint.dropped.len(), 1);
        assert_eq!(blueprint.dropped[0].assignment_id, "a-orphan");
    }

    #[tokio::test]
    async fn test_language_selects_translations() {
        let backend = Arc::new(FlakyBackend::new());
        let connectivity = Connectivity::online();
        let mut session =
            session(&backend, "card", EngineProfile::simple(), &connectivity).with_language("es");
        session.open().await.unwrap();

        let descriptors = session.descriptors();
        assert_eq!(descriptors[0].resolved_label, "Nombre");
        assert_eq!(descriptors[1].resolved_label, "Email");
        assert_eq!(session.language(), "es");
    }

    #[tokio::test]
    async fn test_dynamic_profile_array_defaults() {
        let backend = Arc::new(FlakyBackend::new());
        backend
            .inner
            .put_entry(lead_form_engine::FieldLibraryEntry::new(
                "f-products",
                "products",
                lead_form_engine::FieldDataType::Array,
                "Products",
            ))
            .unwrap();
        backend
            .inner
            .put_assignment("card", FieldAssignment::new("a-products", "f-products"))
            .unwrap();

        let connectivity = Connectivity::online();
        let mut dynamic = session(&backend, "card", EngineProfile::dynamic(), &connectivity);
        dynamic.open().await.unwrap();
        assert_eq!(dynamic.value("products"), Some(&FieldValue::List(Vec::new())));
        assert_eq!(dynamic.value("topics"), Some(&FieldValue::list([""])));

        let mut simple = session(&backend, "card", EngineProfile::simple(), &connectivity);
        simple.open().await.unwrap();
        assert_eq!(simple.value("products"), Some(&FieldValue::list([""])));
    }

    #[tokio::test]
    async fn test_retry_exhaustion_ends_failed() {
        let backend = Arc::new(FlakyBackend::new().failing_fetches(10));
        let connectivity = Connectivity::online();
        let mut session = session(&backend, "card", fast_retries(), &connectivity);

        let result = session.open().await;
        assert!(matches!(
            result,
            Err(SessionError::Load { attempts: 3, .. })
        ));
        assert_eq!(backend.fetch_calls(), 3);
        assert_eq!(session.status(), SessionStatus::Failed);
        assert!(session.values().is_empty());
        assert!(matches!(
            session.notices().as_slice(),
            [FormNotice::TransportError {
                retry: RetryAction::Reload,
                ..
            }]
        ));
        assert_eq!(session.submit_availability(), Err(SubmitBlocked::LoadFailed));
    }

    #[tokio::test]
    async fn test_retry_recovers_within_budget() {
        let backend = Arc::new(FlakyBackend::new().failing_fetches(2));
        let connectivity = Connectivity::online();
        let mut session = session(&backend, "card", fast_retries(), &connectivity);

        session.open().await.unwrap();
        assert_eq!(backend.fetch_calls(), 3);
        assert_eq!(session.status(), SessionStatus::Ready);
        assert!(session.notices().is_empty());
    }

    #[tokio::test]
    async fn test_simple_profile_fails_immediately_then_manual_retry() {
        let backend = Arc::new(FlakyBackend::new().failing_fetches(1));
        let connectivity = Connectivity::online();
        let mut session = session(&backend, "card", EngineProfile::simple(), &connectivity);

        assert!(matches!(
            session.open().await,
            Err(SessionError::Load { attempts: 1, .. })
        ));
        assert_eq!(backend.fetch_calls(), 1);
        assert_eq!(session.status(), SessionStatus::Failed);

        session.refresh().await.unwrap();
        assert_eq!(session.status(), SessionStatus::Ready);
        assert_eq!(backend.fetch_calls(), 2);
        assert!(session.notices().is_empty());
    }

    #[tokio::test]
    async fn test_not_found_is_not_retried() {
        let backend = Arc::new(FlakyBackend::new());
        backend.fetch_not_found.store(true, Ordering::SeqCst);
        let connectivity = Connectivity::online();
        let mut session = session(&backend, "card", fast_retries(), &connectivity);

        assert!(session.open().await.is_err());
        assert_eq!(backend.fetch_calls(), 1);
        assert_eq!(session.status(), SessionStatus::Failed);
    }

    #[tokio::test]
    async fn test_close_during_retry_stops_transitions() {
        let backend = Arc::new(FlakyBackend::new().failing_fetches(10));
        let connectivity = Connectivity::online();
        let profile = EngineProfile::builder()
            .retry_on_load_failure(true)
            .retry_delay(Duration::from_secs(60))
            .build();
        let mut session = session(&backend, "card", profile, &connectivity);
        let handle = session.close_handle();

        let (result, _) = tokio::join!(session.open(), async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            handle.close();
        });

        assert!(matches!(result, Err(SessionError::Closed)));
        assert_eq!(backend.fetch_calls(), 1);
        // No transition after the close
        assert_eq!(session.status(), SessionStatus::Loading);
        assert!(matches!(session.refresh().await, Err(SessionError::Closed)));
        assert_eq!(session.submit_availability(), Err(SubmitBlocked::Closed));
    }

    #[tokio::test]
    async fn test_refresh_of_unchanged_form_reuses_blueprint() {
        let backend = Arc::new(FlakyBackend::new());
        let connectivity = Connectivity::online();
        let mut session = session(&backend, "card", EngineProfile::simple(), &connectivity);
        session.open().await.unwrap();
        let first = Arc::clone(session.blueprint().unwrap());

        session.refresh().await.unwrap();
        assert!(Arc::ptr_eq(&first, session.blueprint().unwrap()));

        backend.inner.remove_assignment("card", "a-size").unwrap();
        session.refresh().await.unwrap();
        assert!(!Arc::ptr_eq(&first, session.blueprint().unwrap()));
    }

    #[tokio::test]
    async fn test_failed_refresh_clears_previous_fields() {
        let backend = Arc::new(FlakyBackend::new());
        let connectivity = Connectivity::online();
        let mut session = session(&backend, "card", EngineProfile::simple(), &connectivity);
        session.open().await.unwrap();
        session.set_value("email", "x@y.zz").unwrap();

        backend.fetch_failures.store(1, Ordering::SeqCst);
        assert!(session.refresh().await.is_err());
        assert_eq!(session.status(), SessionStatus::Failed);
        assert!(session.blueprint().is_none());
        assert!(session.descriptors().is_empty());
        assert!(session.values().is_empty());
        assert!(matches!(
            session.set_value("email", "a@b.co"),
            Err(SessionError::NotReady(SessionStatus::Failed))
        ));

        session.refresh().await.unwrap();
        assert_eq!(session.descriptors().len(), 5);
        assert_eq!(session.value("email"), Some(&FieldValue::text("")));
    }

    #[tokio::test]
    async fn test_refresh_discards_edits() {
        let backend = Arc::new(FlakyBackend::new());
        let connectivity = Connectivity::online();
        let mut session = session(&backend, "card", EngineProfile::simple(), &connectivity);
        session.open().await.unwrap();

        session.set_value("firstName", "Jo").unwrap();
        backend.inner.remove_assignment("card", "a-size").unwrap();

        session.refresh().await.unwrap();
        assert_eq!(session.value("firstName"), Some(&FieldValue::text("")));
        assert_eq!(session.value("companySize"), None);
        assert_eq!(session.descriptors().len(), 4);
    }
}

mod editing_tests {
    use super::*;

    #[tokio::test]
    async fn test_set_value_before_open_fails() {
        let backend = Arc::new(FlakyBackend::new());
        let connectivity = Connectivity::online();
        let mut session = session(&backend, "card", EngineProfile::simple(), &connectivity);

        assert!(matches!(
            session.set_value("email", "a@b.co"),
            Err(SessionError::NotReady(SessionStatus::Idle))
        ));
    }

    #[tokio::test]
    async fn test_unknown_field() {
        let backend = Arc::new(FlakyBackend::new());
        let connectivity = Connectivity::online();
        let mut session = session(&backend, "card", EngineProfile::simple(), &connectivity);
        session.open().await.unwrap();

        assert!(matches!(
            session.set_value("nickname", "JJ"),
            Err(SessionError::UnknownField(_))
        ));
        assert!(matches!(
            session.list_editor("email"),
            Err(SessionError::NotAList(_))
        ));
    }

    #[tokio::test]
    async fn test_errors_are_rechecked_on_edit() {
        let backend = Arc::new(FlakyBackend::new());
        let connectivity = Connectivity::online();
        let mut session = session(&backend, "card", EngineProfile::simple(), &connectivity);
        session.open().await.unwrap();

        let report = session.validate();
        assert!(!report.is_valid());
        assert_eq!(report.errors.len(), 2);
        assert_eq!(session.errors()["email"], "Email is required");

        session.set_value("email", "not-an-email").unwrap();
        assert_eq!(
            session.errors()["email"],
            "Email must be a valid email address"
        );

        session.set_value("email", "a@b.co").unwrap();
        assert!(!session.errors().contains_key("email"));
        // Other fields keep their error
        assert!(session.errors().contains_key("firstName"));

        let descriptors = session.descriptors();
        assert_eq!(
            descriptors[0].current_error.as_deref(),
            Some("First name is required")
        );
        assert_eq!(descriptors[1].current_value, FieldValue::text("a@b.co"));
    }

    #[tokio::test]
    async fn test_list_editor_writes_through() {
        let backend = Arc::new(FlakyBackend::new());
        let connectivity = Connectivity::online();
        let mut session = session(&backend, "card", EngineProfile::simple(), &connectivity);
        session.open().await.unwrap();

        {
            let mut editor = session.list_editor("topics").unwrap();
            assert_eq!(editor.rows(), vec![String::new()]);
            assert!(editor.set_row(0, "pricing").unwrap());
            assert!(editor.add_row().unwrap());
            assert!(editor.add_row().unwrap());
            // maxItems = 3
            assert!(!editor.can_add_row());
            assert!(!editor.add_row().unwrap());
            assert!(editor.set_row(2, "support").unwrap());
            assert!(editor.remove_row(1).unwrap());
            assert!(!editor.remove_row(5).unwrap());
        }

        assert_eq!(
            session.value("topics"),
            Some(&FieldValue::list(["pricing", "support"]))
        );
    }

    #[tokio::test]
    async fn test_set_value_truncates_to_max_items() {
        let backend = Arc::new(FlakyBackend::new());
        let connectivity = Connectivity::online();
        let mut session = session(&backend, "card", EngineProfile::simple(), &connectivity);
        session.open().await.unwrap();

        session
            .set_value("topics", FieldValue::list(["a", "b", "c", "d"]))
            .unwrap();
        assert_eq!(session.value("topics"), Some(&FieldValue::list(["a", "b", "c"])));
    }
}

mod submit_tests {
    use super::*;

    #[tokio::test]
    async fn test_submit_before_open_is_blocked() {
        let backend = Arc::new(FlakyBackend::new());
        let connectivity = Connectivity::online();
        let mut session = session(&backend, "card", EngineProfile::simple(), &connectivity);

        let outcome = session.submit().await.unwrap();
        assert_eq!(outcome, SubmitOutcome::Blocked(SubmitBlocked::NotLoaded));
        assert_eq!(backend.submit_calls(), 0);
    }

    #[tokio::test]
    async fn test_template_without_fields_is_blocked() {
        let backend = Arc::new(FlakyBackend::new());
        let connectivity = Connectivity::online();
        let mut session = session(&backend, "empty", EngineProfile::simple(), &connectivity);
        session.open().await.unwrap();

        assert_eq!(session.status(), SessionStatus::Ready);
        assert_eq!(
            session.submit().await.unwrap(),
            SubmitOutcome::Blocked(SubmitBlocked::NoFields)
        );
    }

    #[tokio::test]
    async fn test_invalid_values_are_not_submitted() {
        let backend = Arc::new(FlakyBackend::new());
        let connectivity = Connectivity::online();
        let mut session = session(&backend, "card", EngineProfile::simple(), &connectivity);
        session.open().await.unwrap();
        session.set_value("firstName", "Jo").unwrap();
        session.set_value("companySize", "huge").unwrap();

        let SubmitOutcome::Invalid(report) = session.submit().await.unwrap() else {
            panic!("expected invalid outcome");
        };
        assert_eq!(report.errors.len(), 2);
        assert!(report.errors.contains_key("email"));
        assert!(report.errors.contains_key("companySize"));
        assert_eq!(session.status(), SessionStatus::Ready);
        assert_eq!(backend.submit_calls(), 0);
    }

    #[tokio::test]
    async fn test_successful_submit_resets_values() {
        let backend = Arc::new(FlakyBackend::new());
        let connectivity = Connectivity::online();
        let mut session = session(&backend, "card", EngineProfile::simple(), &connectivity);
        session.open().await.unwrap();
        fill_valid(&mut session);
        session
            .set_value("topics", FieldValue::list(["pricing", ""]))
            .unwrap();

        let outcome = session.submit().await.unwrap();
        assert!(matches!(outcome, SubmitOutcome::Accepted(_)));
        assert_eq!(session.status(), SessionStatus::Succeeded);
        assert_eq!(session.value("email"), Some(&FieldValue::text("")));

        let leads = backend.inner.leads().unwrap();
        assert_eq!(leads.len(), 1);
        let lead = &leads[0];
        assert_eq!(lead.form_template_id, "card");
        assert_eq!(lead.site_id, "site-1");
        assert_eq!(lead.email.as_deref(), Some("a@b.co"));
        assert_eq!(lead.first_name.as_deref(), Some("Jo"));
        assert_eq!(lead.form_data["email"], FieldValue::text("a@b.co"));
        assert_eq!(lead.form_data["consent"], FieldValue::text("false"));
        assert_eq!(lead.form_data["topics"], FieldValue::list(["pricing"]));

        // Editing again reopens the form
        session.set_value("firstName", "Sam").unwrap();
        assert_eq!(session.status(), SessionStatus::Ready);
    }

    #[tokio::test]
    async fn test_rejected_submit_returns_to_ready() {
        let backend = Arc::new(FlakyBackend::new());
        backend.reject_submits.store(true, Ordering::SeqCst);
        let connectivity = Connectivity::online();
        let mut session = session(&backend, "card", EngineProfile::simple(), &connectivity);
        session.open().await.unwrap();
        fill_valid(&mut session);

        let result = session.submit().await;
        assert!(matches!(
            result,
            Err(SessionError::Submission(BackendError::Rejected(_)))
        ));
        assert_eq!(backend.submit_calls(), 1);
        assert_eq!(session.status(), SessionStatus::Ready);
        assert_eq!(session.value("email"), Some(&FieldValue::text("a@b.co")));
        assert_eq!(
            session.notices(),
            vec![FormNotice::TransportError {
                message: "Your submission was rejected: duplicate lead".to_string(),
                retry: RetryAction::Resubmit,
            }]
        );

        // Explicit resubmit only
        backend.reject_submits.store(false, Ordering::SeqCst);
        assert!(matches!(
            session.submit().await.unwrap(),
            SubmitOutcome::Accepted(_)
        ));
        assert_eq!(backend.submit_calls(), 2);
        assert!(session.notices().is_empty());
    }

    #[tokio::test]
    async fn test_offline_blocks_submit_without_losing_values() {
        let backend = Arc::new(FlakyBackend::new());
        let connectivity = Connectivity::online();
        let mut session = session(&backend, "card", EngineProfile::simple(), &connectivity);
        session.open().await.unwrap();
        fill_valid(&mut session);

        connectivity.set_online(false);
        let outcome = session.submit().await.unwrap();
        assert_eq!(outcome, SubmitOutcome::Blocked(SubmitBlocked::Offline));
        assert_eq!(session.status(), SessionStatus::Ready);
        assert_eq!(session.notices(), vec![FormNotice::Offline]);
        assert!(!FormNotice::Offline.is_dismissible());
        assert_eq!(backend.submit_calls(), 0);

        connectivity.set_online(true);
        assert!(session.sync_connectivity());
        assert!(session.notices().is_empty());
        assert_eq!(session.value("firstName"), Some(&FieldValue::text("Jo")));
        assert!(matches!(
            session.submit().await.unwrap(),
            SubmitOutcome::Accepted(_)
        ));
    }

    #[tokio::test]
    async fn test_connectivity_changed_is_observed() {
        let backend = Arc::new(FlakyBackend::new());
        let connectivity = Connectivity::online();
        let mut session = session(&backend, "card", EngineProfile::simple(), &connectivity);
        session.open().await.unwrap();

        connectivity.set_online(false);
        assert!(!session.connectivity_changed().await);
        assert!(session.is_offline());
        assert_eq!(session.submit_availability(), Err(SubmitBlocked::Offline));
    }
}
