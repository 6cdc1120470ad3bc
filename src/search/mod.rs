//! Tantivy-based search index for the search panel.
//!
//! Indexes file nodes (directories are skipped) by name, path and content, and scopes
//! every query to a single project.

use std::path::Path;
use std::sync::Arc;
use tantivy::collector::TopDocs;
use tantivy::query::{BooleanQuery, BoostQuery, Occur, Query, QueryParser, TermQuery};
use tantivy::schema::{Field, IndexRecordOption, Schema, Value, STORED, STRING, TEXT};
use tantivy::{doc, Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument, Term};
use tokio::sync::RwLock;

use crate::errors::AppError;
use crate::models::FileNode;

/// Field boost values.
const BOOST_NAME: f32 = 10.0;
const BOOST_PATH: f32 = 5.0;
const BOOST_CONTENT: f32 = 3.0;

/// Search hit with relevance score.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub file_id: String,
    pub score: f32,
}

/// Search index schema fields.
struct SearchFields {
    file_id: Field,
    project_id: Field,
    name: Field,
    path: Field,
    content: Field,
}

/// Tantivy search index for file nodes.
pub struct SearchIndex {
    index: Index,
    reader: IndexReader,
    writer: Arc<RwLock<IndexWriter>>,
    fields: SearchFields,
}

impl SearchIndex {
    /// Create or open a search index at the specified path.
    pub fn open(index_path: &Path) -> Result<Self, AppError> {
        std::fs::create_dir_all(index_path)
            .map_err(|e| AppError::Search(format!("Failed to create index directory: {}", e)))?;

        let mut schema_builder = Schema::builder();
        let file_id = schema_builder.add_text_field("file_id", STRING | STORED);
        let project_id = schema_builder.add_text_field("project_id", STRING);
        let name = schema_builder.add_text_field("name", TEXT);
        let path = schema_builder.add_text_field("path", TEXT);
        let content = schema_builder.add_text_field("content", TEXT);
        let schema = schema_builder.build();

        let fields = SearchFields {
            file_id,
            project_id,
            name,
            path,
            content,
        };

        let index = Index::open_in_dir(index_path)
            .or_else(|_| Index::create_in_dir(index_path, schema.clone()))
            .map_err(|e| AppError::Search(format!("Failed to open/create index: {}", e)))?;

        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::OnCommitWithDelay)
            .try_into()
            .map_err(|e| AppError::Search(format!("Failed to create reader: {}", e)))?;

        let writer = index
            .writer(50_000_000) // 50MB buffer
            .map_err(|e| AppError::Search(format!("Failed to create writer: {}", e)))?;

        Ok(Self {
            index,
            reader,
            writer: Arc::new(RwLock::new(writer)),
            fields,
        })
    }

    /// Rebuild the entire index from the stored nodes.
    pub async fn rebuild(&self, nodes: &[FileNode]) -> Result<(), AppError> {
        let mut writer = self.writer.write().await;

        writer.delete_all_documents()?;

        let mut indexed = 0;
        for node in nodes.iter().filter(|node| !node.is_directory) {
            writer.add_document(self.create_document(node))?;
            indexed += 1;
        }

        writer.commit()?;
        self.reader.reload()?;

        tracing::info!("Search index rebuilt with {} files", indexed);
        Ok(())
    }

    /// Index (or re-index) a batch of nodes.
    pub async fn index_nodes(&self, nodes: &[FileNode]) -> Result<(), AppError> {
        let mut writer = self.writer.write().await;

        for node in nodes {
            writer.delete_term(Term::from_field_text(self.fields.file_id, &node.id));
            if !node.is_directory {
                writer.add_document(self.create_document(node))?;
            }
        }

        writer.commit()?;
        self.reader.reload()?;

        Ok(())
    }

    /// Index (or re-index) a single node.
    pub async fn index_node(&self, node: &FileNode) -> Result<(), AppError> {
        self.index_nodes(std::slice::from_ref(node)).await
    }

    /// Remove nodes from the index.
    pub async fn remove_nodes(&self, file_ids: &[String]) -> Result<(), AppError> {
        if file_ids.is_empty() {
            return Ok(());
        }

        let mut writer = self.writer.write().await;
        for file_id in file_ids {
            writer.delete_term(Term::from_field_text(self.fields.file_id, file_id));
        }
        writer.commit()?;

        self.reader.reload()?;

        Ok(())
    }

    /// Remove every document belonging to a project.
    pub async fn remove_project(&self, project_id: &str) -> Result<(), AppError> {
        let mut writer = self.writer.write().await;

        writer.delete_term(Term::from_field_text(self.fields.project_id, project_id));
        writer.commit()?;

        self.reader.reload()?;

        Ok(())
    }

    /// Search a project's files for the query.
    pub fn search(
        &self,
        project_id: &str,
        query_str: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<SearchResult>, AppError> {
        if query_str.trim().is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let searcher = self.reader.searcher();
        let num_docs = usize::try_from(searcher.num_docs()).unwrap_or(usize::MAX);
        if offset >= num_docs {
            return Ok(Vec::new());
        }
        // Never ask the collector for more than the index holds.
        let fetch = limit.saturating_add(offset).min(num_docs);

        let query_parser = QueryParser::for_index(
            &self.index,
            vec![self.fields.name, self.fields.path, self.fields.content],
        );

        let base_query = query_parser
            .parse_query(query_str)
            .map_err(|e| AppError::Search(format!("Invalid search query: {}", e)))?;

        let mut subqueries: Vec<(Occur, Box<dyn Query>)> = Vec::new();

        let field_queries = [
            (self.fields.name, BOOST_NAME),
            (self.fields.path, BOOST_PATH),
            (self.fields.content, BOOST_CONTENT),
        ];

        for (field, boost) in field_queries {
            let field_parser = QueryParser::for_index(&self.index, vec![field]);
            if let Ok(field_query) = field_parser.parse_query(query_str) {
                let boosted = BoostQuery::new(field_query, boost);
                subqueries.push((Occur::Should, Box::new(boosted)));
            }
        }

        let text_query = if subqueries.is_empty() {
            base_query
        } else {
            Box::new(BooleanQuery::new(subqueries))
        };

        let project_query = TermQuery::new(
            Term::from_field_text(self.fields.project_id, project_id),
            IndexRecordOption::Basic,
        );

        let scoped_query = BooleanQuery::new(vec![
            (Occur::Must, Box::new(project_query) as Box<dyn Query>),
            (Occur::Must, text_query),
        ]);

        let top_docs = searcher
            .search(&scoped_query, &TopDocs::with_limit(fetch))
            .map_err(|e| AppError::Search(format!("Search failed: {}", e)))?;

        let results: Vec<SearchResult> = top_docs
            .into_iter()
            .skip(offset)
            .take(limit)
            .filter_map(|(score, doc_address)| {
                let doc: TantivyDocument = searcher.doc(doc_address).ok()?;
                let file_id = doc.get_first(self.fields.file_id)?.as_str()?.to_string();
                Some(SearchResult { file_id, score })
            })
            .collect();

        Ok(results)
    }

    fn create_document(&self, node: &FileNode) -> TantivyDocument {
        doc!(
            self.fields.file_id => node.id.clone(),
            self.fields.project_id => node.project_id.clone(),
            self.fields.name => node.name.clone(),
            self.fields.path => node.path.clone(),
            self.fields.content => node.content.clone()
        )
    }
}
