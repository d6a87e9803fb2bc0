// src/common/fold.rs

use sqlx::PgPool;
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// Dobra de acentos: remove diacríticos para busca e ordenação.
///
/// Duas implementações atrás de um único ponto de entrada: a decomposição
/// NFD cobre qualquer texto Unicode; a tabela manual cobre bancos com
/// encoding latino legado. A escolha acontece uma vez, na subida, sondando
/// o encoding do servidor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccentFolder {
    Nfd,
    Tabela,
}

impl AccentFolder {
    pub async fn detect(pool: &PgPool) -> Result<Self, sqlx::Error> {
        let encoding: String = sqlx::query_scalar("SHOW server_encoding")
            .fetch_one(pool)
            .await?;
        if encoding.eq_ignore_ascii_case("UTF8") {
            Ok(AccentFolder::Nfd)
        } else {
            Ok(AccentFolder::Tabela)
        }
    }

    /// Dobrar duas vezes dá o mesmo resultado que dobrar uma vez.
    pub fn fold(&self, texto: &str) -> String {
        match self {
            AccentFolder::Nfd => texto.nfd().filter(|c| !is_combining_mark(*c)).collect(),
            AccentFolder::Tabela => texto.chars().map(substituir).collect(),
        }
    }

    /// Chave de comparação insensível a caixa e a acento.
    pub fn chave(&self, texto: &str) -> String {
        self.fold(texto).to_lowercase()
    }
}

fn substituir(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
        'Á' | 'À' | 'Â' | 'Ã' | 'Ä' => 'A',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'É' | 'È' | 'Ê' | 'Ë' => 'E',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'Ó' | 'Ò' | 'Ô' | 'Õ' | 'Ö' => 'O',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
        'ç' => 'c',
        'Ç' => 'C',
        'ñ' => 'n',
        'Ñ' => 'N',
        _ => c,
    }
}
