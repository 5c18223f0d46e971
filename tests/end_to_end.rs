//! Full pipeline runs over the fixture tree in `tests/fixtures`, discovered
//! from disk by the directory scanner.

mod fixtures;

use fixtures::chain::{Bottom, Chain, Middle, Top};
use fixtures::reporting::{ReportService, Reports};
use fixtures::services::App;
use fixtures::services::database::DatabaseService;
use fixtures::services::email::Notifier;
use fixtures::services::logging::LoggingService;
use fixtures::services::user::UserComponent;
use simple_ioc::{
    BeanRegistry, Classification, Container, DiError, Instantiator, TypeCatalog, root_namespace,
};
use std::sync::Arc;

/// Container scanning this test crate's sources
fn container() -> Container {
    Container::builder()
        .source_root(simple_ioc::source_root!())
        .build()
}

#[test]
fn test_user_component_scenario() {
    let container = container();
    let report = container
        .try_run_namespace(root_namespace::<App>())
        .unwrap();

    assert_eq!(report.discovered, 4);
    assert_eq!(report.beans, 4);
    assert!(report.failures.is_empty());

    let user = container
        .get_bean_as::<UserComponent>("UserComponent")
        .unwrap();
    let database = container
        .get_bean_as::<DatabaseService>("DatabaseService")
        .unwrap();
    let email = container.get_bean_as::<dyn Notifier>("EmailService").unwrap();
    let logging = container
        .get_bean_as::<LoggingService>("LoggingService")
        .unwrap();

    assert!(Arc::ptr_eq(user.database.as_ref().unwrap(), &database));
    assert!(Arc::ptr_eq(user.email.as_ref().unwrap(), &email));
    assert!(Arc::ptr_eq(user.logging.as_ref().unwrap(), &logging));

    assert_eq!(
        user.process_user(7),
        vec![
            "[LOG] Processing user-7@memory".to_string(),
            "Sending email to user-7@memory: Welcome!".to_string(),
        ]
    );
}

#[test]
fn test_run_is_quiet_and_idempotent() {
    let container = container();
    container.run::<App>();
    let first = container.get_bean("UserComponent").unwrap();

    container.run::<App>();

    assert_eq!(container.registry().len(), 4);
    assert!(container.get_bean("UserComponent").unwrap().ptr_eq(&first));
}

#[test]
fn test_constructor_injection_from_earlier_run() {
    let container = container();
    container.run::<App>();

    let report = container
        .try_run_namespace(root_namespace::<Reports>())
        .unwrap();

    // ReportService, the colliding LoggingService, ReportTemplate
    assert_eq!(report.discovered, 3);
    assert!(report.failures.is_empty());
    assert_eq!(report.beans, 5);

    let service = container
        .get_bean_as::<ReportService>("ReportService")
        .unwrap();
    let database = container
        .get_bean_as::<DatabaseService>("DatabaseService")
        .unwrap();
    assert!(Arc::ptr_eq(&service.database, &database));
    assert_eq!(
        service.send_report(3),
        "Sending email to user-3@memory: Your monthly report"
    );

    // First registration under a name is kept
    assert!(container.get_bean_as::<LoggingService>("LoggingService").is_some());
    assert!(
        container
            .get_bean_as::<fixtures::reporting::LoggingService>("LoggingService")
            .is_none()
    );

    assert!(container.get_bean("ReportTemplate").is_none());
}

#[test]
fn test_constructor_dependency_missing_fails_that_bean_only() {
    let container = container();
    let report = container
        .try_run_namespace(root_namespace::<Reports>())
        .unwrap();

    assert_eq!(report.failures.len(), 1);
    assert!(matches!(
        &report.failures[0],
        DiError::CreationFailed { source, .. }
            if matches!(**source, DiError::UnresolvedParameter { .. })
    ));
    assert!(container.get_bean("ReportService").is_none());
    assert!(container.get_bean("LoggingService").is_some());
}

#[test]
fn test_three_level_chain_fails_when_dependent_runs_first() {
    let catalog = TypeCatalog::from_inventory();
    let load = |name: &str| catalog.load(name).unwrap();
    let top = load(concat!(module_path!(), "::fixtures::chain::Top"));
    let middle = load(concat!(module_path!(), "::fixtures::chain::Middle"));
    let bottom = load(concat!(module_path!(), "::fixtures::chain::Bottom"));

    // Top and Middle share the second bucket; put Top first
    let classification = Classification::from_buckets(vec![bottom], vec![top, middle]);
    let registry = BeanRegistry::new();
    let failures = Instantiator::new(&registry).register_all(&classification);

    assert_eq!(failures.len(), 1);
    assert!(failures[0].trace().contains("Dependency not found for field: middle"));
    assert!(!registry.contains("Top"));
    assert!(registry.contains("Middle"));
    assert!(registry.contains("Bottom"));
}

#[test]
fn test_three_level_chain_scanned_order() {
    let container = container();
    let report = container
        .try_run_namespace(root_namespace::<Chain>())
        .unwrap();

    assert_eq!(report.discovered, 3);

    let bottom = container.get_bean_as::<Bottom>("Bottom").unwrap();
    let middle = container.get_bean_as::<Middle>("Middle").unwrap();
    assert!(Arc::ptr_eq(middle.bottom.as_ref().unwrap(), &bottom));

    // Either Middle came first and Top is wired to it, or Top came first and
    // failed on its `middle` field. Nothing else is allowed.
    match container.get_bean_as::<Top>("Top") {
        Some(top) => {
            assert!(report.failures.is_empty());
            assert!(Arc::ptr_eq(top.middle.as_ref().unwrap(), &middle));
        }
        None => {
            assert_eq!(report.failures.len(), 1);
            assert!(matches!(
                &report.failures[0],
                DiError::CreationFailed { type_name, source }
                    if type_name.ends_with("::chain::Top")
                        && matches!(**source, DiError::UnresolvedField { field: "middle", .. })
            ));
        }
    }
}

#[test]
fn test_empty_namespace_gives_empty_registry() {
    let container = container();
    let report = container
        .try_run_namespace(concat!(module_path!(), "::nowhere"))
        .unwrap();

    assert_eq!(report.discovered, 0);
    assert!(container.registry().is_empty());
    assert!(container.get_bean("UserComponent").is_none());
}

#[test]
fn test_global_container() {
    let installed = container().install_global().unwrap();
    installed.run::<App>();

    assert!(container().install_global().is_err());

    let global = Container::global().unwrap();
    assert!(global.get_bean("UserComponent").is_some());
}
