use super::*;
use crate::models::{Tour, TransportOption};
use crate::state::test_helpers::{FakeBackend, FakeMode, sample_tour};

fn tour_service(backend: Arc<FakeBackend>) -> CatalogService<Tour> {
    CatalogService::<Tour>::new(backend, MockCatalog::seeded())
}

// =============================================================================
// Reads
// =============================================================================

#[tokio::test]
async fn get_all_prefers_backend() {
    let backend = FakeBackend::up();
    backend.set_catalog(vec![sample_tour("t-1", "chucuito", false)]);
    let service = tour_service(backend.clone());

    let tours = service.get_all().await;
    assert_eq!(tours.len(), 1);
    assert_eq!(tours[0].id, "t-1");
    assert_eq!(backend.calls(), vec!["list:tours".to_owned()]);
}

#[tokio::test]
async fn get_all_falls_back_to_seed_when_backend_down() {
    let service = tour_service(FakeBackend::down());
    let first = service.get_all().await;
    let second = service.get_all().await;

    assert!(!first.is_empty());
    assert_eq!(first, second);
    assert!(first.iter().all(|tour| tour.id.starts_with("mock-")));
}

#[tokio::test]
async fn get_by_id_falls_back_on_unknown_backend_id() {
    // Backend up but does not know the id: a 404 is still a fallback trigger.
    let service = tour_service(FakeBackend::up());
    let tour = service.get_by_id("mock-tour-2").await.unwrap();
    assert_eq!(tour.slug, "amantani-homestay");
}

#[tokio::test]
async fn get_by_id_missing_everywhere_is_not_found() {
    let service = tour_service(FakeBackend::down());
    let err = service.get_by_id("nope").await.unwrap_err();
    assert_eq!(err, CatalogError::NotFound { resource: "tour", key: "nope".into() });
}

#[tokio::test]
async fn get_by_slug_reads_backend() {
    let backend = FakeBackend::up();
    backend.set_catalog(vec![sample_tour("t-9", "llachon", true)]);
    let service = tour_service(backend);
    assert_eq!(service.get_by_slug("llachon").await.unwrap().id, "t-9");
}

#[tokio::test]
async fn featured_passes_language_and_falls_back() {
    let backend = FakeBackend::down();
    let service = CatalogService::<TransportOption>::new(backend.clone(), MockCatalog::seeded());

    let featured = service.featured(Lang::En).await;
    assert_eq!(backend.calls(), vec!["featured:transport:en".to_owned()]);
    assert!(!featured.is_empty());
    assert!(featured.iter().all(|t| t.featured));
}

// =============================================================================
// Writes
// =============================================================================

#[tokio::test]
async fn create_forwards_token_to_backend() {
    let backend = FakeBackend::up();
    let service = tour_service(backend.clone());
    let created = service.create("tok-1", sample_tour("", "new-tour", false)).await.unwrap();
    assert_eq!(created.id, "backend-1");
    assert_eq!(backend.calls(), vec!["create:tours:tok-1".to_owned()]);
}

#[tokio::test]
async fn create_falls_back_to_mock_when_backend_down() {
    let service = tour_service(FakeBackend::down());
    let created = service.create("tok-1", sample_tour("", "offline-tour", false)).await.unwrap();

    assert!(created.id.starts_with("mock-"));
    assert_eq!(service.get_by_slug("offline-tour").await.unwrap().id, created.id);
}

#[tokio::test]
async fn writes_surface_rejected_credentials() {
    let backend = FakeBackend::up();
    backend.set_mode(FakeMode::Unauthorized);
    let service = tour_service(backend);

    assert_eq!(
        service.create("bad", sample_tour("", "x", false)).await.unwrap_err(),
        CatalogError::Unauthorized
    );
    assert_eq!(
        service.update("bad", "mock-tour-1", sample_tour("", "x", false)).await.unwrap_err(),
        CatalogError::Unauthorized
    );
    assert_eq!(service.delete("bad", "mock-tour-1").await.unwrap_err(), CatalogError::Unauthorized);

    // The offline copy is untouched.
    assert_eq!(service.get_all().await.len(), 3);
}

#[tokio::test]
async fn update_fallback_keeps_id() {
    let service = tour_service(FakeBackend::down());
    let updated = service
        .update("tok-1", "mock-tour-3", sample_tour("ignored", "sillustani-sunset", false))
        .await
        .unwrap();
    assert_eq!(updated.id, "mock-tour-3");
    assert_eq!(service.get_by_id("mock-tour-3").await.unwrap().slug, "sillustani-sunset");
}

#[tokio::test]
async fn delete_fallback_missing_id_is_not_found() {
    let service = tour_service(FakeBackend::down());
    assert!(service.delete("tok-1", "mock-tour-1").await.is_ok());
    assert_eq!(
        service.delete("tok-1", "mock-tour-1").await.unwrap_err(),
        CatalogError::NotFound { resource: "tour", key: "mock-tour-1".into() }
    );
}
