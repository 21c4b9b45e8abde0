//! LSP server implementation using lsp-server (synchronous).
//!
//! Requests are handled one at a time on the calling thread. Every answer is
//! derived from the current text of the requested document; the symbol table
//! is memoised per document revision by the salsa database.

use std::collections::HashSet;
use std::error::Error;
use std::io;

use lsp_server::{Connection, Message, Notification, Request, RequestId, Response};
use lsp_types::{
    CompletionItem, CompletionItemKind, CompletionList, CompletionOptions, CompletionParams,
    DidChangeTextDocumentParams, DidCloseTextDocumentParams, DidOpenTextDocumentParams,
    DocumentFormattingParams, DocumentSymbol, DocumentSymbolParams, DocumentSymbolResponse,
    Documentation, GotoDefinitionParams, GotoDefinitionResponse, Hover, HoverContents,
    HoverParams, HoverProviderCapability, InitializeParams, Location, MarkupContent, MarkupKind,
    OneOf, Position, Range, ServerCapabilities, SymbolKind as LspSymbolKind,
    TextDocumentContentChangeEvent, TextDocumentSyncCapability, TextDocumentSyncKind,
    TextDocumentSyncOptions, TextEdit, Uri,
    notification::{DidChangeTextDocument, DidCloseTextDocument, DidOpenTextDocument},
    request::{
        Completion, DocumentSymbolRequest, Formatting, GotoDefinition, HoverRequest,
        ResolveCompletionItem,
    },
};
use proxpl_index::{
    CompletionKind, Span, Symbol, SymbolKind, definitions_named, describe, format_edits,
    prefix_before, suggest_completions, vocabulary_kind, word_span_at,
};
use ropey::Rope;

use super::tracing_layer::LspLayerHandle;
use proxpl_lsp::{Document, ProxDatabase, symbol_table};

type ServerResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

/// Main LSP server state.
struct LspServer {
    connection: Connection,
    db: ProxDatabase,
}

impl LspServer {
    fn new(connection: Connection) -> Self {
        Self {
            connection,
            db: ProxDatabase::default(),
        }
    }

    fn run(&mut self) -> ServerResult<()> {
        loop {
            let msg = self.connection.receiver.recv()?;
            if self.process_message(msg)? {
                return Ok(());
            }
        }
    }

    /// Process a single message. Returns `Ok(true)` if shutdown was requested.
    fn process_message(&mut self, msg: Message) -> ServerResult<bool> {
        match msg {
            Message::Request(req) => {
                if self.connection.handle_shutdown(&req)? {
                    return Ok(true);
                }
                self.handle_request(req)?;
            }
            Message::Response(_) => {
                // We don't send requests, so we shouldn't get responses
            }
            Message::Notification(notif) => {
                self.handle_notification(notif);
            }
        }
        Ok(false)
    }

    fn handle_request(&mut self, req: Request) -> ServerResult<()> {
        tracing::debug!(method = %req.method, "Received request");

        if let Some((id, params)) = cast_request::<HoverRequest>(&req) {
            let result = self.hover(params);
            self.respond(id, result)?;
        } else if let Some((id, params)) = cast_request::<GotoDefinition>(&req) {
            let result = self.goto_definition(params);
            self.respond(id, result)?;
        } else if let Some((id, params)) = cast_request::<Completion>(&req) {
            let result = self.completion(params);
            self.respond(id, result)?;
        } else if let Some((id, item)) = cast_request::<ResolveCompletionItem>(&req) {
            let result = resolve_completion(item);
            self.respond(id, result)?;
        } else if let Some((id, params)) = cast_request::<DocumentSymbolRequest>(&req) {
            let result = self.document_symbols(params);
            self.respond(id, result)?;
        } else if let Some((id, params)) = cast_request::<Formatting>(&req) {
            let result = self.formatting(params);
            self.respond(id, result)?;
        } else {
            tracing::debug!(method = %req.method, "Unhandled request");
            let response = Response::new_err(
                req.id,
                lsp_server::ErrorCode::MethodNotFound as i32,
                format!("unhandled method: {}", req.method),
            );
            self.connection.sender.send(Message::Response(response))?;
        }
        Ok(())
    }

    fn respond<T: serde::Serialize>(&self, id: RequestId, result: T) -> ServerResult<()> {
        let response = Response::new_ok(id, result);
        self.connection.sender.send(Message::Response(response))?;
        Ok(())
    }

    fn handle_notification(&mut self, notif: Notification) {
        if let Some(params) = cast_notification::<DidOpenTextDocument>(&notif) {
            self.did_open(params);
        } else if let Some(params) = cast_notification::<DidChangeTextDocument>(&notif) {
            self.did_change(params);
        } else if let Some(params) = cast_notification::<DidCloseTextDocument>(&notif) {
            self.did_close(params);
        }
    }

    fn did_open(&mut self, params: DidOpenTextDocumentParams) {
        let item = params.text_document;
        tracing::info!(uri = ?item.uri, version = item.version, "Document opened");

        let rope = Rope::from_str(&item.text);
        self.db.open_document(item.uri.as_str(), rope, item.version);
    }

    /// Apply a batch of edits. A batch with an unusable range is dropped as a
    /// whole and the document keeps its last good text.
    fn did_change(&mut self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        let version = params.text_document.version;
        let Some(doc) = self.db.document(uri.as_str()) else {
            tracing::warn!(uri = ?uri, "Change for unknown document");
            return;
        };

        let mut rope = doc.text(&self.db).clone();
        for change in params.content_changes {
            if let Err(error) = apply_change(&mut rope, change) {
                tracing::warn!(
                    uri = ?uri,
                    version,
                    kept_version = doc.version(&self.db),
                    %error,
                    "Rejected document change"
                );
                return;
            }
        }
        self.db.update_document(doc, rope, version);
    }

    fn did_close(&mut self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        tracing::info!(uri = ?uri, "Document closed");
        self.db.close_document(uri.as_str());
    }

    /// Look up an open document and convert an LSP position into a byte offset.
    fn locate(&self, uri: &Uri, position: Position) -> Option<(Document, String, usize)> {
        let doc = self.db.document(uri.as_str())?;
        let rope = doc.text(&self.db);
        let offset = offset_from_position(rope, position)?;
        Some((doc, rope.to_string(), offset))
    }

    fn hover(&self, params: HoverParams) -> Option<Hover> {
        let uri = &params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;

        tracing::debug!(
            line = position.line,
            character = position.character,
            "Hover request"
        );

        let (doc, text, offset) = self.locate(uri, position)?;
        let span = word_at(&text, offset)?;
        let word = span.slice(&text)?;

        let value = match describe(word) {
            Some(description) => description.to_string(),
            None => {
                let table = symbol_table(&self.db, doc);
                let declarations: Vec<_> = definitions_named(table, word).collect();
                if declarations.is_empty() {
                    return None;
                }
                render_declarations(&declarations)
            }
        };

        Some(Hover {
            contents: HoverContents::Markup(MarkupContent {
                kind: MarkupKind::Markdown,
                value,
            }),
            range: Some(span_to_range(doc.text(&self.db), span)),
        })
    }

    fn goto_definition(&self, params: GotoDefinitionParams) -> Option<GotoDefinitionResponse> {
        let uri = &params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;

        tracing::debug!(
            line = position.line,
            character = position.character,
            "Go to Definition request"
        );

        let (doc, text, offset) = self.locate(uri, position)?;
        let span = word_at(&text, offset)?;
        let name = span.slice(&text)?;

        let rope = doc.text(&self.db);
        let table = symbol_table(&self.db, doc);
        let mut locations: Vec<Location> = definitions_named(table, name)
            .map(|symbol| Location {
                uri: uri.clone(),
                range: span_to_range(rope, symbol.span),
            })
            .collect();

        tracing::debug!(name, count = locations.len(), "Found definitions");

        match locations.len() {
            0 => None,
            1 => locations.pop().map(GotoDefinitionResponse::Scalar),
            _ => Some(GotoDefinitionResponse::Array(locations)),
        }
    }

    fn completion(&self, params: CompletionParams) -> Option<CompletionList> {
        let uri = &params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;

        tracing::debug!(
            line = position.line,
            character = position.character,
            "Completion request"
        );

        let (doc, text, offset) = self.locate(uri, position)?;
        let prefix = match prefix_before(&text, offset) {
            Ok(prefix) => prefix,
            Err(error) => {
                tracing::warn!(%error, "Completion offset rejected");
                return None;
            }
        };

        let mut seen = HashSet::new();
        let mut items: Vec<CompletionItem> = suggest_completions(Some(prefix))
            .into_iter()
            .inspect(|entry| {
                seen.insert(entry.label.to_string());
            })
            .map(|entry| CompletionItem {
                label: entry.label.to_string(),
                kind: Some(completion_item_kind(entry.kind)),
                ..Default::default()
            })
            .collect();

        // Names declared in this document
        for symbol in symbol_table(&self.db, doc) {
            if !symbol.name.starts_with(prefix) || !seen.insert(symbol.name.clone()) {
                continue;
            }
            items.push(CompletionItem {
                label: symbol.name.clone(),
                kind: Some(match symbol.kind {
                    SymbolKind::Function => CompletionItemKind::FUNCTION,
                    SymbolKind::Class => CompletionItemKind::CLASS,
                }),
                detail: Some(format!("{} {}", symbol.kind.keyword(), symbol.name)),
                ..Default::default()
            });
        }

        tracing::debug!(prefix, count = items.len(), "Completion items");

        Some(CompletionList {
            is_incomplete: false,
            items,
        })
    }

    fn document_symbols(&self, params: DocumentSymbolParams) -> Option<DocumentSymbolResponse> {
        let uri = &params.text_document.uri;
        let doc = self.db.document(uri.as_str())?;
        let rope = doc.text(&self.db);

        tracing::debug!(uri = ?uri, "Document symbols request");

        let symbols: Vec<DocumentSymbol> = symbol_table(&self.db, doc)
            .iter()
            .map(|symbol| create_symbol(symbol, rope))
            .collect();

        tracing::debug!(count = symbols.len(), "Found document symbols");

        Some(DocumentSymbolResponse::Nested(symbols))
    }

    fn formatting(&self, params: DocumentFormattingParams) -> Option<Vec<TextEdit>> {
        let uri = &params.text_document.uri;
        let doc = self.db.document(uri.as_str())?;
        let rope = doc.text(&self.db);

        let edits: Vec<TextEdit> = format_edits(&rope.to_string())
            .into_iter()
            .map(|edit| TextEdit {
                range: span_to_range(rope, edit.span),
                new_text: edit.new_text,
            })
            .collect();

        tracing::debug!(uri = ?uri, count = edits.len(), "Formatting edits");

        Some(edits)
    }
}

/// Fill in the detail and documentation of a vocabulary completion item.
fn resolve_completion(mut item: CompletionItem) -> CompletionItem {
    if item.detail.is_none()
        && let Some(kind) = vocabulary_kind(&item.label)
    {
        item.detail = Some(kind.detail().to_string());
        item.documentation = Some(Documentation::String(kind.documentation().to_string()));
    }
    item
}

fn completion_item_kind(kind: CompletionKind) -> CompletionItemKind {
    match kind {
        CompletionKind::Keyword => CompletionItemKind::KEYWORD,
        CompletionKind::Function => CompletionItemKind::FUNCTION,
    }
}

/// Markdown listing the declarations of a user-defined name.
fn render_declarations(declarations: &[&Symbol]) -> String {
    let mut value = String::from("```proxpl\n");
    for symbol in declarations {
        value.push_str(symbol.kind.keyword());
        value.push(' ');
        value.push_str(&symbol.name);
        value.push('\n');
    }
    value.push_str("```");
    if declarations.len() > 1 {
        value.push_str(&format!("\n\n{} declarations", declarations.len()));
    }
    value
}

/// The identifier under the cursor, logging rejected offsets.
fn word_at(text: &str, offset: usize) -> Option<Span> {
    match word_span_at(text, offset) {
        Ok(span) => span,
        Err(error) => {
            tracing::warn!(%error, "Cursor offset rejected");
            None
        }
    }
}

/// Get the server capabilities for the ProXPL language server.
fn server_capabilities() -> ServerCapabilities {
    ServerCapabilities {
        text_document_sync: Some(TextDocumentSyncCapability::Options(
            TextDocumentSyncOptions {
                open_close: Some(true),
                change: Some(TextDocumentSyncKind::INCREMENTAL),
                ..Default::default()
            },
        )),
        hover_provider: Some(HoverProviderCapability::Simple(true)),
        definition_provider: Some(OneOf::Left(true)),
        completion_provider: Some(CompletionOptions {
            resolve_provider: Some(true),
            ..Default::default()
        }),
        document_symbol_provider: Some(OneOf::Left(true)),
        document_formatting_provider: Some(OneOf::Left(true)),
        ..Default::default()
    }
}

/// Initialize the LSP server with the given connection.
///
/// This performs the LSP initialize handshake and returns a ready-to-run server.
fn initialize_server(connection: Connection) -> ServerResult<LspServer> {
    let capabilities = server_capabilities();
    let server_capabilities = serde_json::to_value(&capabilities)?;
    let init_params = connection.initialize(server_capabilities)?;
    let params: InitializeParams = serde_json::from_value(init_params)?;
    if let Some(info) = params.client_info {
        tracing::info!(client = %info.name, version = ?info.version, "Client connected");
    }
    Ok(LspServer::new(connection))
}

/// Run a server on an established connection until the client shuts it down.
///
/// Log forwarding through `log_handle` starts once the handshake completes.
pub fn run_connection(
    connection: Connection,
    log_handle: Option<LspLayerHandle>,
) -> ServerResult<()> {
    let mut server = initialize_server(connection)?;
    if let Some(handle) = &log_handle {
        handle.mark_initialized();
    }
    tracing::info!("ProXPL language server initialized");
    let result = server.run();
    if let Some(handle) = &log_handle {
        handle.detach();
    }
    result
}

fn apply_change(rope: &mut Rope, change: TextDocumentContentChangeEvent) -> ServerResult<()> {
    match change.range {
        Some(range) => {
            let start = offset_from_position(rope, range.start)
                .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "invalid start position"))?;
            let end = offset_from_position(rope, range.end)
                .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "invalid end position"))?;
            let start_char = rope.byte_to_char(start);
            let end_char = rope.byte_to_char(end.max(start));
            rope.remove(start_char..end_char);
            rope.insert(start_char, &change.text);
        }
        None => *rope = Rope::from_str(&change.text),
    }
    Ok(())
}

/// Convert an LSP position to a byte offset.
///
/// Characters past the end of a line clamp to the line end; a line past the
/// end of the document yields `None`.
fn offset_from_position(rope: &Rope, position: Position) -> Option<usize> {
    let line = position.line as usize;
    if line >= rope.len_lines() {
        return None;
    }
    let line_start_char = rope.line_to_char(line);
    let line_slice = rope.line(line);
    let mut end = line_slice.len_chars();
    while end > 0 && matches!(line_slice.char(end - 1), '\n' | '\r') {
        end -= 1;
    }
    let slice = line_slice.slice(..end);
    let utf16_offset = (position.character as usize).min(slice.len_utf16_cu());
    let char_offset = slice.utf16_cu_to_char(utf16_offset);
    Some(rope.char_to_byte(line_start_char + char_offset))
}

/// Convert a byte offset to an LSP position, clamping to the document.
fn position_from_offset(rope: &Rope, offset: usize) -> Position {
    let offset = offset.min(rope.len_bytes());
    let char_index = rope.byte_to_char(offset);
    let line = rope.char_to_line(char_index);
    let line_start = rope.line_to_char(line);
    let character = rope.char_to_utf16_cu(char_index) - rope.char_to_utf16_cu(line_start);
    Position {
        line: line as u32,
        character: character as u32,
    }
}

fn span_to_range(rope: &Rope, span: Span) -> Range {
    Range {
        start: position_from_offset(rope, span.start),
        end: position_from_offset(rope, span.end),
    }
}

fn create_symbol(symbol: &Symbol, rope: &Rope) -> DocumentSymbol {
    let kind = match symbol.kind {
        SymbolKind::Function => LspSymbolKind::FUNCTION,
        SymbolKind::Class => LspSymbolKind::CLASS,
    };
    DocumentSymbol {
        name: symbol.name.clone(),
        detail: None,
        kind,
        tags: None,
        range: span_to_range(rope, symbol.span),
        selection_range: span_to_range(rope, symbol.name_span),
        children: None,
        #[allow(deprecated)]
        deprecated: None,
    }
}

/// Cast a request to a specific type.
fn cast_request<R: lsp_types::request::Request>(req: &Request) -> Option<(RequestId, R::Params)> {
    if req.method == R::METHOD {
        let params = serde_json::from_value(req.params.clone()).ok()?;
        Some((req.id.clone(), params))
    } else {
        None
    }
}

/// Cast a notification to a specific type.
fn cast_notification<N: lsp_types::notification::Notification>(
    notif: &Notification,
) -> Option<N::Params> {
    if notif.method == N::METHOD {
        serde_json::from_value(notif.params.clone()).ok()
    } else {
        None
    }
}
