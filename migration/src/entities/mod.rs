pub mod aluno;
pub mod chamada;
pub mod curso;
pub mod documento_aluno;
pub mod historico_alteracoes;
pub mod matricula;
pub mod presenca;
pub mod responsavel;
pub mod responsavel_aluno;
pub mod turma;
pub mod usuario;

pub use aluno::Entity as AlunoEntity;
pub use chamada::Entity as ChamadaEntity;
pub use curso::Entity as CursoEntity;
pub use documento_aluno::Entity as DocumentoAlunoEntity;
pub use historico_alteracoes::Entity as HistoricoAlteracoesEntity;
pub use matricula::Entity as MatriculaEntity;
pub use presenca::Entity as PresencaEntity;
pub use responsavel::Entity as ResponsavelEntity;
pub use responsavel_aluno::Entity as ResponsavelAlunoEntity;
pub use turma::Entity as TurmaEntity;
pub use usuario::Entity as UsuarioEntity;
