// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore backend for trip records.

use crate::db::{collections, TripRecord};
use crate::error::AppError;

/// Create a Firestore client.
///
/// If FIRESTORE_EMULATOR_HOST is set, connects to the emulator without credentials.
pub(crate) async fn connect(project_id: &str) -> Result<firestore::FirestoreDb, AppError> {
    if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
        return connect_emulator(project_id).await;
    }

    let client = firestore::FirestoreDb::new(project_id)
        .await
        .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

    tracing::info!(project = project_id, "Connected to Firestore");
    Ok(client)
}

/// Emulator connection with a dummy bearer token.
async fn connect_emulator(project_id: &str) -> Result<firestore::FirestoreDb, AppError> {
    tracing::info!("Using unauthenticated connection for Firestore Emulator");

    let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
        Ok(gcloud_sdk::Token {
            token_type: "Bearer".to_string(),
            token: gcloud_sdk::SecretValue::new(
                "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                    .to_string()
                    .into(),
            ),
            expiry: chrono::Utc::now() + chrono::Duration::hours(1),
        })
    });

    let options = firestore::FirestoreDbOptions::new(project_id.to_string());

    let client = firestore::FirestoreDb::with_options_token_source(
        options,
        gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
        gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
    )
    .await
    .map_err(|e| AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e)))?;

    tracing::info!(project = project_id, "Connected to Firestore (Emulator)");
    Ok(client)
}

/// Read a trip record by document ID.
pub(crate) async fn get_record(
    client: &firestore::FirestoreDb,
    id: &str,
) -> Result<Option<TripRecord>, AppError> {
    client
        .fluent()
        .select()
        .by_id_in(collections::TRIPS)
        .obj()
        .one(id)
        .await
        .map_err(|e| AppError::Database(e.to_string()))
}

/// Write a full trip record.
pub(crate) async fn put_record(
    client: &firestore::FirestoreDb,
    id: &str,
    record: &TripRecord,
) -> Result<(), AppError> {
    let _: TripRecord = client
        .fluent()
        .update()
        .in_col(collections::TRIPS)
        .document_id(id)
        .object(record)
        .execute()
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    Ok(())
}
