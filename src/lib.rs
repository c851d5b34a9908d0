// Module layout (Clean Architecture style)
// - bootstrap: configuration and startup
// - infrastructure: document store and user directory adapters
// - presentation: HTTP handlers and routing
// - application: write authorization, ports and use cases
// - domain: core models and the write policy
// - tester: scripted replay of documents against a running gateway

pub mod application;
pub mod bootstrap;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
pub mod tester;
