// src/services/estoque.rs

use std::collections::HashSet;

use chrono::{Datelike, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;
use validator::ValidationErrors;

use crate::{
    common::{
        error::{field_error, AppError},
        fold::AccentFolder,
    },
    db::EstoqueRepository,
    models::{
        estoque::{
            Controlador, Coordenacao, LinhaEstoque, LinhaHistorico, Reagente, Relatorio,
            SaidaReagente, StatusValidade,
        },
        perfil::Role,
    },
    services::policy::{self, Operacao},
};

// --- Entradas das operações ---

#[derive(Debug, Clone)]
pub struct NovaSaida {
    pub reagente_id: Uuid,
    pub coordenacao_id: Uuid,
    pub requisitante: String,
    pub quantidade: i32,
    pub observacao: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NovaAlocacao {
    pub coordenacao_id: Uuid,
    pub quantidade: i32,
}

#[derive(Debug, Clone)]
pub struct NovoReagente {
    pub nome: String,
    pub fispq: String,
    pub controlador_id: Uuid,
    pub armario: String,
    pub validade: NaiveDate,
    pub nota_fiscal: Option<String>,
    pub alocacoes: Vec<NovaAlocacao>,
}

#[derive(Debug, Clone, Default)]
pub struct FiltroListagem {
    pub search: Option<String>,
    pub ordenar: Option<String>,
    pub coordenacao_id: Option<Uuid>,
}

#[derive(Clone)]
pub struct EstoqueService {
    repo: EstoqueRepository,
    folder: AccentFolder,
    pool: PgPool,
}

impl EstoqueService {
    pub fn new(repo: EstoqueRepository, folder: AccentFolder, pool: PgPool) -> Self {
        Self { repo, folder, pool }
    }

    // ---
    // Saída de reagente (baixa de estoque)
    // ---

    /// Dá baixa no saldo e registra a saída como uma unidade atômica.
    ///
    /// A linha de saldo fica travada (FOR UPDATE) do teste de quantidade
    /// até o commit, então duas saídas simultâneas sobre o mesmo par nunca
    /// passam juntas do saldo disponível.
    pub async fn register_saida(
        &self,
        role: &Role,
        input: &NovaSaida,
    ) -> Result<SaidaReagente, AppError> {
        policy::authorize(role, Operacao::CreateSaida)?;
        validar_nova_saida(input)?;

        let requisitante = input.requisitante.trim();
        let observacao = input
            .observacao
            .as_deref()
            .map(str::trim)
            .filter(|o| !o.is_empty());

        let mut tx = self.pool.begin().await?;

        self.repo
            .find_reagente(&mut *tx, input.reagente_id)
            .await?
            .ok_or(AppError::NotFound("Reagente"))?;

        let alocacao = self
            .repo
            .get_alocacao_for_update(&mut *tx, input.reagente_id, input.coordenacao_id)
            .await?
            .ok_or(AppError::AllocationNotFound)?;

        // Tudo ou nada: sem baixa parcial.
        if alocacao.quantidade < input.quantidade {
            return Err(AppError::InsufficientStock);
        }

        self.repo
            .decrement_alocacao(&mut *tx, alocacao.id, input.quantidade)
            .await?;
        let saida = self
            .repo
            .create_saida(
                &mut *tx,
                input.reagente_id,
                input.coordenacao_id,
                requisitante,
                input.quantidade,
                observacao,
            )
            .await?;

        tx.commit().await?;

        tracing::info!(
            reagente = %input.reagente_id,
            coordenacao = %input.coordenacao_id,
            quantidade = input.quantidade,
            "Saída registrada"
        );
        Ok(saida)
    }

    // ---
    // Registro de reagente
    // ---

    /// Cria o reagente e uma linha de saldo por coordenação, tudo na mesma
    /// transação.
    pub async fn register_reagente(
        &self,
        role: &Role,
        input: &NovoReagente,
    ) -> Result<Reagente, AppError> {
        policy::authorize(role, Operacao::CreateReagente)?;
        validar_novo_reagente(input, Utc::now().date_naive())?;

        let mut tx = self.pool.begin().await?;

        let reagente = self
            .repo
            .create_reagente(
                &mut *tx,
                input.nome.trim(),
                input.fispq.trim(),
                input.controlador_id,
                input.armario.trim(),
                input.validade,
                input.nota_fiscal.as_deref(),
            )
            .await?;

        for alocacao in &input.alocacoes {
            self.repo
                .create_alocacao(
                    &mut *tx,
                    reagente.id,
                    alocacao.coordenacao_id,
                    alocacao.quantidade,
                )
                .await?;
        }

        tx.commit().await?;
        Ok(reagente)
    }

    // ---
    // Listagens
    // ---

    pub async fn list_estoque(
        &self,
        role: &Role,
        filtro: &FiltroListagem,
    ) -> Result<Vec<LinhaEstoque>, AppError> {
        policy::authorize(role, Operacao::ListEstoque)?;

        let escopo = policy::coordenacao_scope(role, filtro.coordenacao_id);
        let mut linhas = self.repo.list_estoque(escopo).await?;

        let hoje = Utc::now().date_naive();
        for linha in &mut linhas {
            linha.status_validade = StatusValidade::calcular(linha.validade, hoje);
        }

        if let Some(termo) = termo_de_busca(filtro) {
            let chave = self.folder.chave(&termo);
            linhas.retain(|linha| {
                [
                    linha.reagente_nome.as_str(),
                    linha.fispq.as_str(),
                    linha.controlador_nome.as_str(),
                    linha.coordenacao_nome.as_str(),
                ]
                .iter()
                .any(|campo| self.folder.chave(campo).contains(&chave))
            });
        }

        match filtro.ordenar.as_deref() {
            Some("validade") => linhas.sort_by_key(|linha| linha.validade),
            Some("nome") => linhas.sort_by_cached_key(|linha| {
                // Empate na forma dobrada resolve pelo nome bruto.
                (self.folder.chave(&linha.reagente_nome), linha.reagente_nome.clone())
            }),
            _ => {}
        }

        Ok(linhas)
    }

    // Mesmo filtro e escopo do estoque; a busca também cobre o requisitante
    // e nenhuma linha é escondida por quantidade.
    pub async fn list_historico(
        &self,
        role: &Role,
        filtro: &FiltroListagem,
    ) -> Result<Vec<LinhaHistorico>, AppError> {
        policy::authorize(role, Operacao::ListHistorico)?;

        let escopo = policy::coordenacao_scope(role, filtro.coordenacao_id);
        let mut linhas = self.repo.list_historico(escopo).await?;

        if let Some(termo) = termo_de_busca(filtro) {
            let chave = self.folder.chave(&termo);
            linhas.retain(|linha| {
                [
                    linha.reagente_nome.as_str(),
                    linha.fispq.as_str(),
                    linha.controlador_nome.as_str(),
                    linha.coordenacao_nome.as_str(),
                    linha.requisitante.as_str(),
                ]
                .iter()
                .any(|campo| self.folder.chave(campo).contains(&chave))
            });
        }

        match filtro.ordenar.as_deref() {
            Some("validade") => linhas.sort_by_key(|linha| linha.validade),
            Some("nome") => linhas.sort_by_cached_key(|linha| {
                (self.folder.chave(&linha.reagente_nome), linha.reagente_nome.clone())
            }),
            // Default: data de saída decrescente, já ordenado pelo banco.
            _ => {}
        }

        Ok(linhas)
    }

    // ---
    // Relatório
    // ---

    pub async fn relatorio(&self, role: &Role) -> Result<Relatorio, AppError> {
        policy::authorize(role, Operacao::GerarRelatorio)?;

        let hoje = Utc::now().date_naive();
        let coordenacoes = self.repo.resumo_por_coordenacao().await?;
        let (vencidos, em_alerta) = self
            .repo
            .contar_validade(hoje, hoje + chrono::Duration::days(365))
            .await?;
        let total_saidas = self.repo.contar_saidas().await?;

        Ok(Relatorio {
            coordenacoes,
            reagentes_vencidos: vencidos,
            reagentes_em_alerta: em_alerta,
            total_saidas,
        })
    }

    // ---
    // Cadastros de referência
    // ---

    pub async fn get_all_coordenacoes(&self) -> Result<Vec<Coordenacao>, AppError> {
        self.repo.get_all_coordenacoes().await
    }

    pub async fn create_coordenacao(
        &self,
        role: &Role,
        nome: &str,
    ) -> Result<Coordenacao, AppError> {
        policy::authorize(role, Operacao::ManageCadastros)?;
        let nome = nome_obrigatorio(nome)?;
        self.repo.create_coordenacao(nome).await
    }

    pub async fn delete_coordenacao(&self, role: &Role, id: Uuid) -> Result<(), AppError> {
        policy::authorize(role, Operacao::ManageCadastros)?;
        if self.repo.delete_coordenacao(id).await? == 0 {
            return Err(AppError::NotFound("Coordenação"));
        }
        Ok(())
    }

    pub async fn get_all_controladores(&self) -> Result<Vec<Controlador>, AppError> {
        self.repo.get_all_controladores().await
    }

    pub async fn create_controlador(
        &self,
        role: &Role,
        nome: &str,
    ) -> Result<Controlador, AppError> {
        policy::authorize(role, Operacao::ManageCadastros)?;
        let nome = nome_obrigatorio(nome)?;
        self.repo.create_controlador(nome).await
    }

    pub async fn delete_controlador(&self, role: &Role, id: Uuid) -> Result<(), AppError> {
        policy::authorize(role, Operacao::ManageCadastros)?;
        if self.repo.delete_controlador(id).await? == 0 {
            return Err(AppError::NotFound("Controlador"));
        }
        Ok(())
    }
}

fn termo_de_busca(filtro: &FiltroListagem) -> Option<String> {
    filtro
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

fn nome_obrigatorio(nome: &str) -> Result<&str, AppError> {
    let nome = nome.trim();
    if nome.is_empty() {
        let mut errors = ValidationErrors::new();
        errors.add("nome".into(), field_error("obrigatorio", "O nome é obrigatório."));
        return Err(AppError::ValidationError(errors));
    }
    Ok(nome)
}

// ---
// Validações (antes de qualquer acesso ao banco)
// ---

fn validar_nova_saida(input: &NovaSaida) -> Result<(), AppError> {
    let mut errors = ValidationErrors::new();

    if input.requisitante.trim().is_empty() {
        errors.add(
            "requisitante".into(),
            field_error("obrigatorio", "Informe o requisitante."),
        );
    }
    if input.quantidade < 1 {
        errors.add(
            "quantidade".into(),
            field_error("min", "Quantidade deve ser maior que zero."),
        );
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::ValidationError(errors))
    }
}

// Reporta todos os campos inválidos de uma vez, inclusive linha a linha
// das alocações.
fn validar_novo_reagente(input: &NovoReagente, hoje: NaiveDate) -> Result<(), AppError> {
    let mut errors = ValidationErrors::new();

    if input.nome.trim().is_empty() {
        errors.add(
            "nome".into(),
            field_error("obrigatorio", "Informe o nome do reagente."),
        );
    }
    if input.fispq.trim().is_empty() {
        errors.add("fispq".into(), field_error("obrigatorio", "Informe o FISPQ."));
    }
    if input.armario.trim().is_empty() {
        errors.add(
            "armario".into(),
            field_error("obrigatorio", "Informe o armário."),
        );
    }

    if input.validade.year() < 1900 {
        errors.add(
            "validade".into(),
            field_error("invalida", "Data de validade inválida."),
        );
    } else if input.validade.year() > hoje.year() + 50 {
        errors.add(
            "validade".into(),
            field_error("distante", "Data de validade muito distante."),
        );
    }

    if input.alocacoes.is_empty() {
        errors.add(
            "alocacoes".into(),
            field_error(
                "obrigatorio",
                "Adicione ao menos uma coordenação com quantidade.",
            ),
        );
    }

    let mut coordenacoes_vistas = HashSet::new();
    for (i, alocacao) in input.alocacoes.iter().enumerate() {
        if alocacao.quantidade < 1 {
            errors.add(
                format!("alocacoes[{i}].quantidade").leak(),
                field_error("min", "Quantidade deve ser maior que zero."),
            );
        }
        if !coordenacoes_vistas.insert(alocacao.coordenacao_id) {
            errors.add(
                format!("alocacoes[{i}].coordenacao").leak(),
                field_error("duplicada", "Não repita a mesma coordenação."),
            );
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::ValidationError(errors))
    }
}
