//! OpenAPI documentation configuration
//!
//! Generates OpenAPI 3.0 specification for the identity verification proxy API.

use utoipa::OpenApi;

use crate::handlers::{HealthResponse, ProxyErrorBody, ReadyResponse};

/// Identity Verification Proxy API - OpenAPI Documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "IdVerify - Verification Proxy API",
        version = "0.1.0",
        description = r#"
## Identity Document Verification Proxy

IdVerify forwards identity verification requests to a remote analysis service:

- **Multipart relay** - accepts an identity document and a live selfie in a single request
- **Verdict passthrough** - JSON verdicts from the analysis service are relayed verbatim
- **Error normalization** - non-JSON upstream failures become a stable `{error, details}` envelope

### How It Works

1. **Submit** the document (`aadhar` part) and selfie (`selfie` part) via `POST /api/verify`
2. Both files are forwarded to the analysis service as a fresh multipart request
3. A JSON verdict (`status`, `age`, `dob`, `matchConfidence`) is returned unchanged
4. Upstream crashes or plain-text errors are wrapped so clients always see JSON
"#,
        license(
            name = "MIT OR Apache-2.0",
            url = "https://github.com/idverify/idverify/blob/main/LICENSE"
        ),
        contact(
            name = "IdVerify Team",
            url = "https://github.com/idverify/idverify"
        )
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    tags(
        (name = "Verification", description = "Forward identity documents and selfies for verification"),
        (name = "Monitoring", description = "Service health and readiness endpoints")
    ),
    paths(
        crate::handlers::health::health,
        crate::handlers::health::ready,
        crate::handlers::verify::verify_handler,
    ),
    components(
        schemas(
            HealthResponse,
            ReadyResponse,
            ProxyErrorBody,
        )
    )
)]
pub struct ApiDoc;
