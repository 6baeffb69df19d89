//! The sync loops driven through in-memory stores.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use opsync_core::category::Category;
use opsync_core::field_value::{CustomMap, Period, Version};
use opsync_core::fields::{FieldCategory, FieldsDefinition};
use opsync_core::legacy::LegacyCategory;
use opsync_core::material::{Material, MaterialVersion};
use opsync_core::migrate::Document;
use opsync_core::pagination::{Page, PageRequest};
use opsync_core::plan::{PlacingContent, PlacingMaterial, Plan, UserSelection};
use opsync_core::position::MaterialPosition;
use opsync_core::scope::{ScopeEnv, ScopeTable};
use opsync_core::store::{DocumentSink, FieldSchemaSource, MaterialStore, PageSource};
use opsync_core::sync_record::{lock_unpoisoned, RecordKind};
use opsync_core::types::{epoch, parse_doc_id, DocId};
use opsync_events::{EventSender, OutboundMessage, PublishError};
use opsync_pipeline::sync::{copy_collection, materialize_plans, migrate_collection};
use opsync_pipeline::{ActionSummary, RunContext};

// ---------------------------------------------------------------------------
// In-memory stores
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
#[error("write refused")]
struct Refused;

struct MemPages<T> {
    docs: Vec<T>,
}

#[async_trait]
impl<T: Clone + Send + Sync> PageSource<T> for MemPages<T> {
    type Error = Refused;

    fn source_name(&self) -> String {
        "legacy.items".into()
    }

    async fn fetch_page(&self, request: PageRequest) -> Result<Page<T>, Refused> {
        let skip = usize::try_from(request.skip()).unwrap();
        let items = self
            .docs
            .iter()
            .skip(skip)
            .take(request.page_size as usize)
            .cloned()
            .collect();
        Ok(Page::new(items, request, self.docs.len() as u64))
    }
}

#[derive(Default)]
struct MemSchemas {
    known: Vec<String>,
    lookups: Mutex<usize>,
}

#[async_trait]
impl FieldSchemaSource for MemSchemas {
    type Error = Refused;

    async fn fetch_schema(
        &self,
        type_id: &str,
        category: FieldCategory,
    ) -> Result<Option<FieldsDefinition>, Refused> {
        *lock_unpoisoned(&self.lookups) += 1;
        Ok(self
            .known
            .iter()
            .any(|t| t == type_id)
            .then(|| FieldsDefinition::new(type_id, category, vec![])))
    }
}

struct MemSink<T> {
    saved: Mutex<HashMap<DocId, T>>,
    refuse: Vec<DocId>,
}

impl<T> MemSink<T> {
    fn new() -> Self {
        Self::refusing(vec![])
    }

    fn refusing(refuse: Vec<DocId>) -> Self {
        Self {
            saved: Mutex::new(HashMap::new()),
            refuse,
        }
    }

    fn len(&self) -> usize {
        lock_unpoisoned(&self.saved).len()
    }
}

#[async_trait]
impl<T: Document + Clone> DocumentSink<T> for MemSink<T> {
    type Error = Refused;

    async fn replace(&self, doc: &T) -> Result<(), Refused> {
        if self.refuse.contains(&doc.doc_id()) {
            return Err(Refused);
        }
        lock_unpoisoned(&self.saved).insert(doc.doc_id(), doc.clone());
        Ok(())
    }
}

#[derive(Default)]
struct MemMaterials {
    materials: Mutex<HashMap<DocId, Material>>,
}

#[async_trait]
impl MaterialStore for MemMaterials {
    type Error = Refused;

    async fn load_material(&self, id: DocId) -> Result<Option<Material>, Refused> {
        Ok(lock_unpoisoned(&self.materials).get(&id).cloned())
    }

    async fn save_material(&self, material: &Material) -> Result<(), Refused> {
        lock_unpoisoned(&self.materials).insert(material.id, material.clone());
        Ok(())
    }
}

#[derive(Default)]
struct Recording {
    sent: Mutex<Vec<OutboundMessage>>,
}

#[async_trait]
impl EventSender for Recording {
    async fn send(&self, messages: Vec<OutboundMessage>) -> Result<(), PublishError> {
        lock_unpoisoned(&self.sent).extend(messages);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn context() -> (RunContext, Arc<Recording>) {
    let sender = Arc::new(Recording::default());
    let scopes = ScopeTable::parse("camera360:prod").unwrap();
    (RunContext::new(scopes, sender.clone()).with_batch_size(4), sender)
}

fn legacy_category(id: DocId, type_id: &str) -> LegacyCategory {
    LegacyCategory {
        id,
        scope: "camera360".into(),
        name: "Stickers".into(),
        parent_id: String::new(),
        type_id: type_id.into(),
        sort_order: 0,
        system_attributes: vec![],
        localize_attributes: vec![],
        custom_attributes: vec![],
        is_deleted: false,
        creator: String::new(),
        mender: String::new(),
        created_at: epoch(),
        updated_at: epoch(),
    }
}

fn categories(n: usize, type_id: &str) -> Vec<LegacyCategory> {
    (0..n).map(|_| legacy_category(DocId::new(), type_id)).collect()
}

fn material(vip: i32) -> Material {
    Material {
        id: DocId::new(),
        scope: "camera360".into(),
        type_id: "sticker".into(),
        is_deleted: false,
        versions: vec![MaterialVersion {
            version_id: DocId::new(),
            version_name: String::new(),
            name: "m".into(),
            vip,
            tag: vec![],
            platform: vec![],
            client_version: Version::default(),
            valid_duration: Period::default(),
            created_at: epoch(),
            updated_at: epoch(),
            creator: String::new(),
            mender: String::new(),
            status: String::new(),
            custom: CustomMap::new(),
            localize: vec![],
        }],
    }
}

fn plan_placing(material_id: DocId, vip: Option<bool>) -> Plan {
    Plan {
        id: DocId::new(),
        pos_id: DocId::new(),
        scope: "camera360".into(),
        plan_type: String::new(),
        name: String::new(),
        active: true,
        begin: None,
        end: None,
        priority: 0,
        user_selection: UserSelection::default(),
        placing_contents: vec![PlacingContent {
            id: DocId::new(),
            ratio: 100,
            category_type_def_id: String::new(),
            categories: vec![],
            materials: vec![PlacingMaterial {
                id: material_id.to_hex(),
                version_id: String::new(),
                vip,
                period: None,
            }],
        }],
        decision_data_changed_at: None,
        is_deleted: false,
        created_at: None,
        updated_at: None,
        creator: String::new(),
        editor: String::new(),
    }
}

// ---------------------------------------------------------------------------
// migrate_collection
// ---------------------------------------------------------------------------

#[tokio::test]
async fn migrates_every_page_and_publishes_what_was_written() {
    let (ctx, sender) = context();
    let se = ScopeEnv::new("camera360", "prod");
    let pages = MemPages { docs: categories(25, "sticker") };
    let schemas = MemSchemas {
        known: vec!["sticker".into()],
        ..Default::default()
    };
    let sink = MemSink::<Category>::new();

    let summary = migrate_collection(&ctx, &se, &pages, &schemas, &sink).await.unwrap();

    assert_eq!(
        summary,
        ActionSummary {
            processed: 25,
            written: 25,
            failed: 0,
            published: 25
        }
    );
    assert_eq!(sink.len(), 25);
    assert_eq!(*lock_unpoisoned(&schemas.lookups), 1);
    assert!(ctx.errors.is_empty());

    let sent = lock_unpoisoned(&sender.sent);
    assert_eq!(sent.len(), 25);
    assert!(sent
        .iter()
        .all(|m| m.topic == "operational-materials-svc.category.operate"));
}

#[tokio::test]
async fn missing_schema_is_recorded_per_document() {
    let (ctx, sender) = context();
    let se = ScopeEnv::new("camera360", "prod");
    let mut docs = categories(3, "unknown");
    docs.extend(categories(2, "sticker"));
    let pages = MemPages { docs };
    let schemas = MemSchemas {
        known: vec!["sticker".into()],
        ..Default::default()
    };
    let sink = MemSink::<Category>::new();

    let summary = migrate_collection(&ctx, &se, &pages, &schemas, &sink).await.unwrap();

    assert_eq!(summary.failed, 3);
    assert_eq!(summary.written, 2);
    assert_eq!(lock_unpoisoned(&sender.sent).len(), 2);
    // One lookup per type id; the miss is cached too.
    assert_eq!(*lock_unpoisoned(&schemas.lookups), 2);

    let records = ctx.errors.snapshot();
    assert_eq!(records.len(), 3);
    assert!(records.iter().all(|r| r.kind == RecordKind::Category
        && r.source == "legacy.items"
        && r.message == "field definition unknown (material_category) not found"
        && r.scope == "camera360"
        && r.env == "prod"));
}

#[tokio::test]
async fn refused_writes_are_recorded_and_not_published() {
    let (ctx, sender) = context();
    let se = ScopeEnv::new("camera360", "prod");
    let docs = categories(4, "sticker");
    let refused = docs[1].id;
    let pages = MemPages { docs };
    let schemas = MemSchemas {
        known: vec!["sticker".into()],
        ..Default::default()
    };
    let sink = MemSink::<Category>::refusing(vec![refused]);

    let summary = migrate_collection(&ctx, &se, &pages, &schemas, &sink).await.unwrap();

    assert_eq!(summary.written, 3);
    assert_eq!(summary.published, 3);
    assert!(lock_unpoisoned(&sender.sent)
        .iter()
        .all(|m| m.key != refused.to_hex()));
    let records = ctx.errors.snapshot();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].doc_id, refused.to_hex());
    assert_eq!(records[0].message, "write refused");
}

#[tokio::test]
async fn excluded_ids_are_skipped() {
    let (ctx, _sender) = context();
    let se = ScopeEnv::new("videobeats", "operation");
    let excluded = parse_doc_id("63a51a0fe99dc512b16e916b").unwrap();
    let pages = MemPages {
        docs: vec![legacy_category(excluded, "sticker"), legacy_category(DocId::new(), "sticker")],
    };
    let schemas = MemSchemas {
        known: vec!["sticker".into()],
        ..Default::default()
    };
    let sink = MemSink::<Category>::new();

    let summary = migrate_collection(&ctx, &se, &pages, &schemas, &sink).await.unwrap();

    assert_eq!(summary.processed, 2);
    assert_eq!(summary.written, 1);
    assert!(!lock_unpoisoned(&sink.saved).contains_key(&excluded));
    assert!(ctx.errors.is_empty());
}

// ---------------------------------------------------------------------------
// copy_collection
// ---------------------------------------------------------------------------

#[tokio::test]
async fn copies_documents_unchanged() {
    let (ctx, sender) = context();
    let se = ScopeEnv::new("camera360", "qa");
    let positions: Vec<MaterialPosition> = (0..12)
        .map(|i| {
            bson::from_document(bson::doc! {
                "_id": DocId::new(),
                "code": format!("pos-{i}"),
                "scope": "camera360",
            })
            .unwrap()
        })
        .collect();
    let first = positions[0].clone();
    let pages = MemPages { docs: positions };
    let sink = MemSink::new();

    let summary = copy_collection(&ctx, &se, &pages, &sink).await.unwrap();

    assert_eq!(summary.written, 12);
    assert_eq!(summary.published, 12);
    assert_eq!(lock_unpoisoned(&sink.saved)[&first.id], first);
    let sent = lock_unpoisoned(&sender.sent);
    assert_eq!(sent[0].headers["env"], "qa");
    assert_eq!(sent[0].topic, "operational-materials-svc.position.operate");
}

// ---------------------------------------------------------------------------
// materialize_plans
// ---------------------------------------------------------------------------

#[tokio::test]
async fn override_versions_are_shared_between_plans() {
    let (ctx, sender) = context();
    let se = ScopeEnv::new("camera360", "prod");
    let m = material(1);
    let material_id = m.id;
    let materials = MemMaterials::default();
    lock_unpoisoned(&materials.materials).insert(m.id, m);

    let untouched = plan_placing(material_id, None);
    let pages = MemPages {
        docs: vec![
            plan_placing(material_id, Some(false)),
            plan_placing(material_id, Some(false)),
            untouched.clone(),
        ],
    };
    let sink = MemSink::<Plan>::new();

    let summary = materialize_plans(&ctx, &se, &pages, &materials, &sink).await.unwrap();

    assert_eq!(summary.processed, 3);
    assert_eq!(summary.written, 2);
    assert_eq!(summary.published, 0);
    assert!(lock_unpoisoned(&sender.sent).is_empty());

    let stored = lock_unpoisoned(&materials.materials)[&material_id].clone();
    assert_eq!(stored.versions.len(), 2);
    assert_eq!(stored.versions[1].vip, 0);
    let override_id = stored.versions[1].version_id.to_hex();

    let saved = lock_unpoisoned(&sink.saved);
    assert!(!saved.contains_key(&untouched.id));
    for plan in saved.values() {
        let bound: Vec<&str> = plan.placing_materials().map(|p| p.version_id.as_str()).collect();
        assert_eq!(bound, vec![override_id.as_str()]);
    }
    assert_eq!(ctx.overrides.len(), 1);
}

#[tokio::test]
async fn plan_with_missing_material_is_recorded() {
    let (ctx, _sender) = context();
    let se = ScopeEnv::new("camera360", "prod");
    let plan = plan_placing(DocId::new(), Some(true));
    let plan_id = plan.id;
    let pages = MemPages { docs: vec![plan] };
    let sink = MemSink::<Plan>::new();

    let summary = materialize_plans(&ctx, &se, &pages, &MemMaterials::default(), &sink)
        .await
        .unwrap();

    assert_eq!(summary.failed, 1);
    assert_eq!(sink.len(), 0);
    let records = ctx.errors.snapshot();
    assert_eq!(records[0].doc_id, plan_id.to_hex());
    assert_eq!(records[0].kind, RecordKind::Plan);
}
