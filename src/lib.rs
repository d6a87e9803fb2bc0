// Núcleo do controle de estoque de reagentes: ledger transacional,
// resolução de papel e listagens escopadas. O binário em main.rs só monta
// o roteador por cima destes módulos.

pub mod common;
pub mod config;
pub mod db;
pub mod docs;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
