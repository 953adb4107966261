//! Shopify Admin GraphQL binding of [`RemoteFiles`].
//!
//! | Call | Mutation / request |
//! |---|---|
//! | stage | `stagedUploadsCreate` |
//! | transfer | multipart POST to the staged target URL |
//! | register | `fileCreate` |
//! | delete | `fileDelete` |

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use stockdrop_core::{Credentials, FormParam, ResourceId, StagedTarget};

use crate::error::http_err;
use crate::remote::{FilePart, RegisterRequest, RemoteFiles, StageRequest};
use crate::RemoteError;

const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";

const STAGED_UPLOADS_CREATE: &str = r#"
mutation stagedUploadsCreate($input: [StagedUploadInput!]!) {
  stagedUploadsCreate(input: $input) {
    stagedTargets {
      url
      resourceUrl
      parameters { name value }
    }
    userErrors { field message }
  }
}"#;

const FILE_CREATE: &str = r#"
mutation fileCreate($files: [FileCreateInput!]!) {
  fileCreate(files: $files) {
    files { id fileStatus }
    userErrors { field message }
  }
}"#;

const FILE_DELETE: &str = r#"
mutation fileDelete($fileIds: [ID!]!) {
  fileDelete(fileIds: $fileIds) {
    deletedFileIds
    userErrors { field message }
  }
}"#;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct GraphqlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct UserError {
    #[serde(default)]
    field: Option<Vec<String>>,
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StagedUploadsCreateData {
    staged_uploads_create: Option<StagedUploadsCreatePayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StagedUploadsCreatePayload {
    #[serde(default)]
    staged_targets: Vec<StagedTargetNode>,
    #[serde(default)]
    user_errors: Vec<UserError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StagedTargetNode {
    url: Option<String>,
    resource_url: Option<String>,
    #[serde(default)]
    parameters: Vec<FormParam>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileCreateData {
    file_create: Option<FileCreatePayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileCreatePayload {
    #[serde(default)]
    files: Vec<FileNode>,
    #[serde(default)]
    user_errors: Vec<UserError>,
}

#[derive(Debug, Deserialize)]
struct FileNode {
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileDeleteData {
    file_delete: Option<FileDeletePayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileDeletePayload {
    #[serde(default)]
    user_errors: Vec<UserError>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Remote file service backed by a shop's Admin GraphQL API.
pub struct ShopifyFiles {
    client: reqwest::Client,
    endpoint: String,
    access_token: String,
}

impl ShopifyFiles {
    pub fn new(credentials: &Credentials, api_version: &str) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("stockdrop/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(http_err("client setup"))?;
        Ok(Self {
            client,
            endpoint: graphql_endpoint(&credentials.shop_domain, api_version),
            access_token: credentials.access_token.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn graphql<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        query: &str,
        variables: Value,
    ) -> Result<T, RemoteError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(ACCESS_TOKEN_HEADER, &self.access_token)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await
            .map_err(http_err(operation))?;

        let status = response.status();
        let body = response.text().await.map_err(http_err(operation))?;
        if !status.is_success() {
            return Err(RemoteError::Status {
                operation,
                status: status.as_u16(),
                body,
            });
        }
        parse_graphql_response(operation, &body)
    }
}

#[async_trait]
impl RemoteFiles for ShopifyFiles {
    async fn stage(&self, request: &StageRequest) -> Result<StagedTarget, RemoteError> {
        let data: StagedUploadsCreateData = self
            .graphql("stage", STAGED_UPLOADS_CREATE, stage_variables(request))
            .await?;
        staged_target_from(data)
    }

    async fn transfer(&self, target: &StagedTarget, file: FilePart) -> Result<(), RemoteError> {
        let form = transfer_form(target, file)?;
        let response = self
            .client
            .post(&target.upload_url)
            .multipart(form)
            .send()
            .await
            .map_err(http_err("transfer"))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response
            .text()
            .await
            .unwrap_or_else(|err| format!("<unreadable body: {err}>"));
        Err(RemoteError::Status {
            operation: "transfer",
            status: status.as_u16(),
            body,
        })
    }

    async fn register(&self, request: &RegisterRequest) -> Result<ResourceId, RemoteError> {
        let data: FileCreateData = self
            .graphql("register", FILE_CREATE, register_variables(request))
            .await?;
        resource_id_from(data)
    }

    async fn delete(&self, id: &ResourceId) -> Result<(), RemoteError> {
        let data: FileDeleteData = self
            .graphql("delete", FILE_DELETE, json!({ "fileIds": [id.as_str()] }))
            .await?;
        let payload = data.file_delete.ok_or(RemoteError::MissingField {
            operation: "delete",
            field: "fileDelete",
        })?;
        check_user_errors("delete", &payload.user_errors)
    }
}

// ---------------------------------------------------------------------------
// Request / response shaping
// ---------------------------------------------------------------------------

/// `https://<shop>/admin/api/<version>/graphql.json`. Accepts a bare domain or
/// one carrying a scheme and trailing slash.
pub fn graphql_endpoint(shop_domain: &str, api_version: &str) -> String {
    let domain = shop_domain.trim();
    let domain = domain
        .strip_prefix("https://")
        .or_else(|| domain.strip_prefix("http://"))
        .unwrap_or(domain)
        .trim_end_matches('/');
    format!("https://{domain}/admin/api/{api_version}/graphql.json")
}

fn stage_variables(request: &StageRequest) -> Value {
    json!({
        "input": [{
            "filename": request.filename,
            "mimeType": request.mime_type,
            "resource": "FILE",
            "fileSize": request.size.to_string(),
            "httpMethod": "POST",
        }]
    })
}

fn register_variables(request: &RegisterRequest) -> Value {
    json!({
        "files": [{
            "alt": request.label,
            "contentType": "FILE",
            "originalSource": request.resource_url,
            "filename": request.filename,
        }]
    })
}

/// Signed parameters first, in the order the service returned them; the file last.
fn transfer_form(target: &StagedTarget, file: FilePart) -> Result<Form, RemoteError> {
    let mut form = Form::new();
    for param in &target.parameters {
        form = form.text(param.name.clone(), param.value.clone());
    }
    let part = Part::bytes(file.contents)
        .file_name(file.filename)
        .mime_str(&file.mime_type)
        .map_err(http_err("transfer"))?;
    Ok(form.part("file", part))
}

fn parse_graphql_response<T: DeserializeOwned>(
    operation: &'static str,
    body: &str,
) -> Result<T, RemoteError> {
    let response: GraphqlResponse<T> = serde_json::from_str(body)?;
    if !response.errors.is_empty() {
        let message = response
            .errors
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        return Err(RemoteError::Service { operation, message });
    }
    response.data.ok_or(RemoteError::MissingField {
        operation,
        field: "data",
    })
}

fn check_user_errors(operation: &'static str, errors: &[UserError]) -> Result<(), RemoteError> {
    if errors.is_empty() {
        return Ok(());
    }
    let message = errors
        .iter()
        .map(|e| match &e.field {
            Some(field) if !field.is_empty() => format!("{}: {}", field.join("."), e.message),
            _ => e.message.clone(),
        })
        .collect::<Vec<_>>()
        .join("; ");
    Err(RemoteError::Service { operation, message })
}

fn staged_target_from(data: StagedUploadsCreateData) -> Result<StagedTarget, RemoteError> {
    let payload = data.staged_uploads_create.ok_or(RemoteError::MissingField {
        operation: "stage",
        field: "stagedUploadsCreate",
    })?;
    check_user_errors("stage", &payload.user_errors)?;

    let node = payload
        .staged_targets
        .into_iter()
        .next()
        .ok_or(RemoteError::MissingField {
            operation: "stage",
            field: "stagedTargets",
        })?;
    Ok(StagedTarget {
        upload_url: node.url.ok_or(RemoteError::MissingField {
            operation: "stage",
            field: "url",
        })?,
        resource_url: node.resource_url.ok_or(RemoteError::MissingField {
            operation: "stage",
            field: "resourceUrl",
        })?,
        parameters: node.parameters,
    })
}

fn resource_id_from(data: FileCreateData) -> Result<ResourceId, RemoteError> {
    let payload = data.file_create.ok_or(RemoteError::MissingField {
        operation: "register",
        field: "fileCreate",
    })?;
    check_user_errors("register", &payload.user_errors)?;

    payload
        .files
        .into_iter()
        .next()
        .and_then(|file| file.id)
        .map(ResourceId::from)
        .ok_or(RemoteError::MissingField {
            operation: "register",
            field: "files.id",
        })
}
