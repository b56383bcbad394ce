use schemaforge::{Error, Field, FieldPatch, NewField, NewProject, NewTable, Patch, Store, Table};

async fn setup() -> Result<(Store, Table), Box<dyn std::error::Error>> {
    let store = Store::builder().max_connections(1).connect("sqlite::memory:").await?;
    store.bootstrap().await?;
    let database = store.create_database("postgres").await?;
    let project = store
        .create_project(NewProject {
            name: "shop".to_string(),
            description: None,
            database_id: database.id,
            database_path: None,
            project_path: None,
        })
        .await?;
    let table = store
        .create_table(NewTable {
            project_id: project.id,
            name: "orders".to_string(),
            description: None,
            is_generated: false,
            generated_date: None,
        })
        .await?;
    Ok((store, table))
}

#[tokio::test]
async fn test_create_then_get_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    let (store, table) = setup().await?;

    let data = NewField {
        table_id: table.id,
        name: "customer_id".to_string(),
        datatype_id: 2,
        is_primary: false,
        label: Some("Customer".to_string()),
        display_name: Some("Customer Id".to_string()),
        is_auto_increment: false,
        is_foreign_key: true,
        reference_table_id: Some(table.id),
        reference_table_field_id: Some(41),
    };
    let created = store.create_field(data.clone()).await?;
    let fetched = store.get_field(created.id).await?;

    assert_eq!(
        fetched,
        Field {
            id: created.id,
            table_id: data.table_id,
            name: data.name,
            datatype_id: data.datatype_id,
            is_primary: data.is_primary,
            label: data.label,
            display_name: data.display_name,
            is_auto_increment: data.is_auto_increment,
            is_foreign_key: data.is_foreign_key,
            reference_table_id: data.reference_table_id,
            reference_table_field_id: data.reference_table_field_id,
        }
    );
    Ok(())
}

#[tokio::test]
async fn test_minimal_payload_uses_defaults() -> Result<(), Box<dyn std::error::Error>> {
    let (store, table) = setup().await?;

    let payload = format!(r#"{{"table_id": {}, "field_name": "note", "field_datatype_id": 4}}"#, table.id);
    let data: NewField = serde_json::from_str(&payload)?;
    let created = store.create_field(data).await?;

    assert!(!created.is_primary);
    assert!(!created.is_auto_increment);
    assert!(!created.is_foreign_key);
    assert_eq!(created.label, None);
    assert_eq!(created.reference_table_id, None);
    Ok(())
}

#[tokio::test]
async fn test_fields_listed_in_creation_order() -> Result<(), Box<dyn std::error::Error>> {
    let (store, table) = setup().await?;

    let names = ["zeta", "alpha", "mid"];
    for name in names {
        store.create_field(NewField::new(table.id, name, 1)).await?;
    }

    let listed: Vec<String> = store.list_fields(table.id).await?.into_iter().map(|f| f.name).collect();
    assert_eq!(listed, names);
    assert!(store.list_fields(9_999).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_patch_field() -> Result<(), Box<dyn std::error::Error>> {
    let (store, table) = setup().await?;
    let created = store
        .create_field(NewField { label: Some("Total".to_string()), ..NewField::new(table.id, "total", 10) })
        .await?;

    let patch = FieldPatch {
        is_primary: Patch::Set(true),
        label: Patch::Set(None),
        ..Default::default()
    };
    let updated = store.update_field(created.id, patch).await?;

    assert!(updated.is_primary);
    assert_eq!(updated.label, None);
    assert_eq!(updated.name, "total");
    assert_eq!(updated.datatype_id, 10);
    Ok(())
}

#[tokio::test]
async fn test_move_field_to_another_table() -> Result<(), Box<dyn std::error::Error>> {
    let (store, table) = setup().await?;
    let other = store
        .create_table(NewTable {
            project_id: table.project_id,
            name: "archive".to_string(),
            description: None,
            is_generated: false,
            generated_date: None,
        })
        .await?;
    let field = store.create_field(NewField::new(table.id, "id", 1)).await?;

    let patch: FieldPatch = serde_json::from_str(&format!(r#"{{"table_id": {}}}"#, other.id))?;
    store.update_field(field.id, patch).await?;

    assert!(store.list_fields(table.id).await?.is_empty());
    assert_eq!(store.list_fields(other.id).await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_field_update_and_delete_errors() -> Result<(), Box<dyn std::error::Error>> {
    let (store, table) = setup().await?;
    let field = store.create_field(NewField::new(table.id, "id", 1)).await?;

    let err = store.update_field(field.id, FieldPatch::default()).await.unwrap_err();
    assert!(matches!(err, Error::InvalidRequest(_)));

    let patch = FieldPatch { name: Patch::Set("ghost".to_string()), ..Default::default() };
    let err = store.update_field(9_999, patch).await.unwrap_err();
    assert!(matches!(err, Error::NotFound("Field")));

    assert!(!store.delete_field(9_999).await?);
    assert!(store.delete_field(field.id).await?);
    assert!(matches!(store.get_field(field.id).await.unwrap_err(), Error::NotFound("Field")));
    Ok(())
}
