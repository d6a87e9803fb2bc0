pub mod estoque_repo;
pub mod perfil_repo;
pub mod user_repo;

pub use estoque_repo::EstoqueRepository;
pub use perfil_repo::PerfilRepository;
pub use user_repo::UserRepository;
