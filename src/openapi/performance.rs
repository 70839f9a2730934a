//! The performance API document: auth token minting, service health, and
//! the embedded performance page.

use serde_json::json;

use super::{
    Components, Document, Info, Operation, Parameter, PathItem, RequestBody, Response, Schema, Tag,
};

fn error_response() -> Schema {
    Schema::object(
        [("message", Schema::string()), ("error", Schema::string())],
        &["message", "error"],
    )
}

fn generate_auth_token_request_body() -> Schema {
    Schema::object(
        [
            ("clientId", Schema::string()),
            (
                "clientSecret",
                Schema::string().example(json!("17bd3fbcda124f7292445d3ab1c1c417")),
            ),
            (
                "brandingId",
                Schema::string().description(
                    "The identifier of the branding to use. If not provided, the default \
                     client branding will be used.",
                ),
            ),
            (
                "expires",
                Schema::number()
                    .nullable()
                    .minimum(0)
                    .description("The UTC timestamp at which this token will expire"),
            ),
            (
                "session",
                Schema::string()
                    .description(
                        "A unique reference for a session to scope this signature to. For \
                         instance the session ref may be derived from a user id such that \
                         multiple tokens can access the same session.",
                    )
                    .example(json!("session-1")),
            ),
            (
                "nodes",
                Schema::array(Schema::string())
                    .description(
                        "A list of references to nodes that this user has access to. If not \
                         provided, nodes will not be included in the generated token.",
                    )
                    .example(json!(["node-1", "node-2"])),
            ),
        ],
        &["clientId", "clientSecret", "expires", "session"],
    )
}

fn generate_auth_token_response() -> Schema {
    Schema::object(
        [(
            "token",
            Schema::string().description("Authorisation token"),
        )],
        &["token"],
    )
}

fn service_health() -> Schema {
    Schema::object(
        [
            (
                "health",
                Schema::enumeration(&["Healthy", "Unhealthy"])
                    .description("The health of the service"),
            ),
            (
                "message",
                Schema::string().description("A message relating to the health of a service"),
            ),
            (
                "error",
                Schema::string().description("The error associated with an unhealthy service"),
            ),
        ],
        &["health"],
    )
}

fn service_health_response() -> Schema {
    Schema::object(
        [
            ("api", Schema::reference("serviceHealth")),
            ("database", Schema::reference("serviceHealth")),
            ("pubStorage", Schema::reference("serviceHealth")),
            ("azure", Schema::reference("serviceHealth").deprecated()),
        ],
        &["api", "database", "pubStorage", "azure"],
    )
}

fn embed_request_params() -> Vec<Parameter> {
    vec![
        Parameter::query(
            "token",
            Schema::string().example(json!("pk_test_TOKEN")),
        )
        .required()
        .description("The access token for this embedded context"),
        Parameter::query("from", Schema::string().format("date").example(json!("2020-01-01")))
            .description("The date to report performance calcs from"),
        Parameter::query("to", Schema::string().format("date").example(json!("2021-01-01")))
            .description("The date to report performance calcs to"),
        Parameter::query(
            "currencyIsoCode",
            Schema::string().min_length(3).max_length(3).example(json!("GBP")),
        )
        .description("The currency iso code to report performance in"),
        Parameter::query(
            "investorExtRefs",
            Schema::array(Schema::string()).example(json!(["inv-1", "inv-2"])),
        )
        .description("A list of investor references to calculate performance for"),
        Parameter::query(
            "investorAccountExtRefs",
            Schema::array(Schema::string()).example(json!(["inv-acc-1", "inv-acc-2"])),
        )
        .description("A list of investor account references to calculate performance for"),
    ]
}

/// The full performance API document.
pub fn performance_document() -> Document {
    Document {
        openapi: "3.1.0",
        info: Info {
            version: "1.1.0",
            title: "Performance API",
            description: "The performance reporting API, based on the OpenAPI 3.1 specification",
        },
        tags: vec![
            Tag {
                name: "embed",
                description: "Operations based around embedded components",
            },
            Tag {
                name: "health",
                description: "Operations based around application health",
            },
            Tag {
                name: "auth",
                description: "Operations based around authentication",
            },
        ],
        paths: [
            (
                "/api/auth/token",
                PathItem {
                    post: Some(Operation {
                        tags: vec!["auth"],
                        summary: "Generates an authentication token",
                        description: Some(
                            "Generates an authentication token that authenticates the user and \
                             authorises access to specified resources",
                        ),
                        operation_id: "token",
                        parameters: Vec::new(),
                        request_body: Some(RequestBody::json(Schema::reference(
                            "generateAuthTokenRequestBody",
                        ))),
                        responses: [
                            (
                                "200",
                                Response::json(
                                    "Successful operation",
                                    Schema::reference("generateAuthTokenResponse"),
                                ),
                            ),
                            (
                                "400",
                                Response::json(
                                    "Request failed to validate",
                                    Schema::reference("errorResponse"),
                                ),
                            ),
                            (
                                "401",
                                Response::json(
                                    "Invalid client ID or secret",
                                    Schema::reference("errorResponse"),
                                ),
                            ),
                            (
                                "403",
                                Response::json("Forbidden", Schema::reference("errorResponse")),
                            ),
                            (
                                "500",
                                Response::json(
                                    "Internal server error",
                                    Schema::reference("errorResponse"),
                                ),
                            ),
                        ]
                        .into_iter()
                        .collect(),
                    }),
                    ..Default::default()
                },
            ),
            (
                "/api/health",
                PathItem {
                    get: Some(Operation {
                        tags: vec!["health"],
                        summary: "Retrieves service health information",
                        description: Some(
                            "Retrieves information relating to the health of application services",
                        ),
                        operation_id: "health",
                        parameters: Vec::new(),
                        request_body: None,
                        responses: [
                            (
                                "200",
                                Response::json(
                                    "Successfully retrieved service health information",
                                    Schema::reference("serviceHealthResponse"),
                                ),
                            ),
                            (
                                "503",
                                Response::json(
                                    "Service(s) are currently unavailable",
                                    Schema::reference("serviceHealthResponse"),
                                ),
                            ),
                        ]
                        .into_iter()
                        .collect(),
                    }),
                    ..Default::default()
                },
            ),
            (
                "/embed/pages/performance",
                PathItem {
                    get: Some(Operation {
                        tags: vec!["embed"],
                        summary: "Load the embedded performance page",
                        description: None,
                        operation_id: "embedPagePerformance",
                        parameters: embed_request_params(),
                        request_body: None,
                        responses: [(
                            "200",
                            Response::html(
                                "The request authenticated and loaded successfully",
                                Schema::string(),
                            ),
                        )]
                        .into_iter()
                        .collect(),
                    }),
                    ..Default::default()
                },
            ),
        ]
        .into_iter()
        .collect(),
        components: Components {
            schemas: [
                ("generateAuthTokenRequestBody", generate_auth_token_request_body()),
                ("generateAuthTokenResponse", generate_auth_token_response()),
                ("errorResponse", error_response()),
                ("serviceHealth", service_health()),
                ("serviceHealthResponse", service_health_response()),
            ]
            .into_iter()
            .collect(),
        },
    }
}
