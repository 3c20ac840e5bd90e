//! Extract phase - lowers step declarations to step models.
//!
//! For each declaration this phase resolves the delegate's reactive call
//! shape, infers or validates the domain I/O types, resolves the external
//! mapper when declared and native types differ, and forces service identity
//! from the declaration for internal steps. Extraction failures are
//! step-local: the offending declaration is dropped with an ERROR diagnostic
//! and its siblings continue.
//!
//! After all individual models are built, plugin aspects are expanded into
//! side-effect variants and the combined list is deduplicated by service
//! name, first occurrence winning in original order.

use std::collections::HashSet;

use eyre::Result;
use flowgen_model::{
    DeploymentRole, MapperFallback, StepDeclaration, StepModel, TransportMode, TypeMapping,
    TypeRef,
};

use crate::{
    expand::{AspectExpander, SideEffectExpander},
    naming,
    pipeline::{CompilationContext, Diagnostic, Phase},
    symbols::SymbolTable,
};

/// Phase that converts step declarations into the semantic IR.
pub struct ExtractPhase {
    expanders: Vec<Box<dyn AspectExpander>>,
}

impl ExtractPhase {
    /// Create an extract phase with the built-in side-effect expander.
    pub fn new() -> Self {
        Self {
            expanders: vec![Box::new(SideEffectExpander)],
        }
    }

    /// Add a custom aspect expander.
    pub fn with_expander(mut self, expander: impl AspectExpander + 'static) -> Self {
        self.expanders.push(Box::new(expander));
        self
    }
}

impl Default for ExtractPhase {
    fn default() -> Self {
        Self::new()
    }
}

impl Phase for ExtractPhase {
    fn name(&self) -> &'static str {
        "extract"
    }

    fn description(&self) -> &'static str {
        "Lower step declarations to step models"
    }

    fn run(&self, ctx: &mut CompilationContext) -> Result<()> {
        let symbols = ctx.input.symbols.clone();
        let declarations = ctx.input.declarations.clone();
        let transport = ctx.transport;

        let mut models = Vec::new();
        for declaration in &declarations {
            match extract_step(declaration, &symbols, transport, ctx.options.mapper_fallback_enabled()) {
                Ok(extracted) => {
                    for diagnostic in extracted.diagnostics {
                        ctx.add_diagnostic(diagnostic);
                    }
                    models.push(extracted.model);
                }
                Err(diagnostic) => ctx.add_diagnostic(diagnostic),
            }
        }

        // Expand plugin aspects against the full model list
        let aspects = ctx.aspects.clone();
        for aspect in &aspects {
            for expander in &self.expanders {
                let variants = expander.expand(aspect, &models, &symbols);
                models.extend(variants);
            }
        }

        ctx.models = dedup_by_service_name(models, &mut ctx.diagnostics);
        Ok(())
    }
}

/// A successfully extracted model plus non-fatal diagnostics raised on the
/// way.
struct Extracted {
    model: StepModel,
    diagnostics: Vec<Diagnostic>,
}

/// Resolved reactive signature of a delegate type.
struct DelegateSignature {
    streaming: flowgen_model::StreamingShape,
    native_in: TypeRef,
    native_out: TypeRef,
}

/// How the mapper requirement for a delegated step was satisfied.
enum MapperOutcome {
    NotRequired,
    Resolved(TypeRef),
    Fallback,
}

fn error(declaration: &StepDeclaration, message: impl Into<String>) -> Diagnostic {
    Diagnostic::error("extract", message).for_step(&declaration.name)
}

/// Lower one declaration to a step model.
fn extract_step(
    declaration: &StepDeclaration,
    symbols: &SymbolTable,
    transport: TransportMode,
    fallback_enabled: bool,
) -> std::result::Result<Extracted, Diagnostic> {
    let mut diagnostics = Vec::new();

    let (input, output, streaming, external_mapper, mapper_fallback) =
        if declaration.is_delegated() {
            extract_delegated(declaration, symbols, fallback_enabled, &mut diagnostics)?
        } else {
            extract_internal(declaration, symbols, &mut diagnostics)?
        };

    // Identity is always forced from the declaration, even when the
    // implementation provides its own.
    let service_type = declaration.execution_target.clone();
    if let Some(identity) = symbols
        .resolve(service_type.qualified())
        .and_then(|s| s.identity())
    {
        if identity.name != declaration.name {
            diagnostics.push(
                Diagnostic::note(
                    "extract",
                    format!(
                        "implementation identity '{}' overridden by declared name '{}'",
                        identity.name, declaration.name
                    ),
                )
                .for_step(&declaration.name),
            );
        }
    }

    let hint = symbols
        .resolve(service_type.qualified())
        .and_then(|s| s.parallelism_hint());

    let role = match transport {
        TransportMode::Rest => DeploymentRole::RestServer,
        TransportMode::Grpc | TransportMode::Local => DeploymentRole::PipelineServer,
    };

    let model = StepModel {
        service_name: declaration.name.clone(),
        generated_name: naming::generated_step_name(&declaration.name),
        service_package: service_type.package().to_string(),
        service_type,
        input,
        output,
        streaming,
        enabled_targets: Default::default(),
        role,
        side_effect: false,
        cache_key_generator: declaration.cache_key_generator.clone(),
        ordering: hint.map(|h| h.ordering).unwrap_or_default(),
        thread_safety: hint.map(|h| h.thread_safety).unwrap_or_default(),
        delegate: declaration.delegate.clone(),
        external_mapper,
        mapper_fallback,
        requested_targets: declaration.requested_targets.clone(),
    };

    Ok(Extracted { model, diagnostics })
}

type StepShape = (
    TypeMapping,
    TypeMapping,
    flowgen_model::StreamingShape,
    Option<TypeRef>,
    MapperFallback,
);

/// Delegated path: resolve the delegate signature, then the mapper
/// requirement.
fn extract_delegated(
    declaration: &StepDeclaration,
    symbols: &SymbolTable,
    fallback_enabled: bool,
    diagnostics: &mut Vec<Diagnostic>,
) -> std::result::Result<StepShape, Diagnostic> {
    let delegate = declaration
        .delegate
        .as_ref()
        .expect("caller checked delegation");

    let signature = resolve_delegate_signature(declaration, delegate, symbols)?;

    let declared_in = declaration
        .input
        .clone()
        .unwrap_or_else(|| signature.native_in.clone());
    let declared_out = declaration
        .output
        .clone()
        .unwrap_or_else(|| signature.native_out.clone());

    let outcome = resolve_mapper(
        declaration,
        &declared_in,
        &signature.native_in,
        &declared_out,
        &signature.native_out,
        symbols,
        fallback_enabled,
        diagnostics,
    )?;

    let (external_mapper, mapper_fallback) = match outcome {
        MapperOutcome::NotRequired => (None, MapperFallback::None),
        MapperOutcome::Resolved(mapper) => (Some(mapper), MapperFallback::None),
        MapperOutcome::Fallback => (None, MapperFallback::Serialize),
    };

    let input = side_mapping(declared_in, signature.native_in, external_mapper.clone());
    let output = side_mapping(declared_out, signature.native_out, external_mapper.clone());

    Ok((
        input,
        output,
        signature.streaming,
        external_mapper,
        mapper_fallback,
    ))
}

/// Build the per-side type mapping for a delegated step.
fn side_mapping(declared: TypeRef, native: TypeRef, mapper: Option<TypeRef>) -> TypeMapping {
    if declared == native {
        TypeMapping {
            domain_type: declared,
            mapper_type: None,
            requires_mapping: false,
            native_type: Some(native),
        }
    } else {
        TypeMapping::mapped(declared, native, mapper)
    }
}

/// Internal path: declared types, inferred from the implementation's single
/// operator interface when absent; call shape from the declared cardinality.
fn extract_internal(
    declaration: &StepDeclaration,
    symbols: &SymbolTable,
    _diagnostics: &mut Vec<Diagnostic>,
) -> std::result::Result<StepShape, Diagnostic> {
    let inferred = symbols
        .resolve(declaration.execution_target.qualified())
        .map(|s| s.operator_shapes())
        .and_then(|shapes| match shapes.as_slice() {
            [(_, args)] if args.len() == 2 => Some((args[0].clone(), args[1].clone())),
            _ => None,
        });

    let input = match (&declaration.input, &inferred) {
        (Some(declared), _) => declared.clone(),
        (None, Some((native_in, _))) => native_in.clone(),
        (None, None) => {
            return Err(error(
                declaration,
                format!(
                    "cannot infer input type for '{}'; declare one or implement a single operator interface on '{}'",
                    declaration.name, declaration.execution_target
                ),
            ));
        }
    };
    let output = match (&declaration.output, &inferred) {
        (Some(declared), _) => declared.clone(),
        (None, Some((_, native_out))) => native_out.clone(),
        (None, None) => {
            return Err(error(
                declaration,
                format!(
                    "cannot infer output type for '{}'; declare one or implement a single operator interface on '{}'",
                    declaration.name, declaration.execution_target
                ),
            ));
        }
    };

    Ok((
        TypeMapping::direct(input),
        TypeMapping::direct(output),
        declaration.cardinality.streaming_shape(),
        None,
        MapperFallback::None,
    ))
}

/// Locate exactly one recognized reactive interface on the delegate type.
fn resolve_delegate_signature(
    declaration: &StepDeclaration,
    delegate: &TypeRef,
    symbols: &SymbolTable,
) -> std::result::Result<DelegateSignature, Diagnostic> {
    let Some(symbol) = symbols.resolve(delegate.qualified()) else {
        return Err(error(
            declaration,
            format!("delegate type '{}' not found", delegate),
        ));
    };

    let shapes = symbol.operator_shapes();
    match shapes.as_slice() {
        [] => Err(error(
            declaration,
            format!(
                "delegate '{}' implements none of the recognized reactive operator interfaces",
                delegate
            ),
        )),
        [(streaming, args)] => {
            if args.len() != 2 {
                return Err(error(
                    declaration,
                    format!(
                        "delegate '{}' declares {} type arguments on its operator interface, expected 2",
                        delegate,
                        args.len()
                    ),
                ));
            }
            Ok(DelegateSignature {
                streaming: *streaming,
                native_in: args[0].clone(),
                native_out: args[1].clone(),
            })
        }
        many => Err(error(
            declaration,
            format!(
                "delegate '{}' ambiguously implements {} reactive operator interfaces",
                delegate,
                many.len()
            ),
        )),
    }
}

/// Resolve the mapper requirement for a delegated step.
///
/// A mapper is required whenever the declared domain types differ from the
/// delegate's native types. An explicitly named mapper must exist and carry
/// exactly the four type arguments {declaredIn, delegateIn, declaredOut,
/// delegateOut}; otherwise a unique structural match is inferred from the
/// mapper candidates in the compilation input. When nothing resolves, the
/// serialization fallback substitutes only if globally enabled and requested
/// by the step.
#[allow(clippy::too_many_arguments)]
fn resolve_mapper(
    declaration: &StepDeclaration,
    declared_in: &TypeRef,
    native_in: &TypeRef,
    declared_out: &TypeRef,
    native_out: &TypeRef,
    symbols: &SymbolTable,
    fallback_enabled: bool,
    diagnostics: &mut Vec<Diagnostic>,
) -> std::result::Result<MapperOutcome, Diagnostic> {
    if declared_in == native_in && declared_out == native_out {
        if declaration.mapper.is_some() {
            diagnostics.push(
                Diagnostic::warning(
                    "extract",
                    format!(
                        "mapper on '{}' ignored; declared types match the delegate's native types",
                        declaration.name
                    ),
                )
                .for_step(&declaration.name),
            );
        }
        return Ok(MapperOutcome::NotRequired);
    }

    let expected = [
        declared_in.clone(),
        native_in.clone(),
        declared_out.clone(),
        native_out.clone(),
    ];

    if let Some(mapper) = &declaration.mapper {
        let Some(symbol) = symbols.resolve(mapper.qualified()) else {
            return Err(error(
                declaration,
                format!("mapper type '{}' not found", mapper),
            ));
        };
        let Some(args) = symbol.mapper_args() else {
            return Err(error(
                declaration,
                format!("'{}' does not implement the mapper interface", mapper),
            ));
        };
        if args != expected.as_slice() {
            return Err(error(
                declaration,
                format!(
                    "mapper '{}' maps <{}> but the step requires <{}, {}, {}, {}>",
                    mapper,
                    args.iter()
                        .map(|a| a.qualified())
                        .collect::<Vec<_>>()
                        .join(", "),
                    declared_in,
                    native_in,
                    declared_out,
                    native_out
                ),
            ));
        }
        return Ok(MapperOutcome::Resolved(mapper.clone()));
    }

    // Unique structural inference over the mapper candidates
    let matches: Vec<&TypeRef> = symbols
        .mapper_candidates()
        .filter(|s| s.mapper_args() == Some(expected.as_slice()))
        .map(|s| s.name())
        .collect();

    match matches.as_slice() {
        [] => {
            if fallback_enabled && declaration.mapper_fallback == MapperFallback::Serialize {
                Ok(MapperOutcome::Fallback)
            } else {
                Err(error(
                    declaration,
                    format!(
                        "no mapper maps '{}' to delegate type '{}'; declare one explicitly",
                        declared_in, native_in
                    ),
                ))
            }
        }
        [single] => Ok(MapperOutcome::Resolved((*single).clone())),
        many => Err(error(
            declaration,
            format!(
                "ambiguous mapper inference for '{}': {}",
                declaration.name,
                many.iter()
                    .map(|m| m.qualified())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        )),
    }
}

/// Deduplicate models by service name: first occurrence wins, original order
/// preserved, duplicates dropped with an ERROR diagnostic.
fn dedup_by_service_name(
    models: Vec<StepModel>,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<StepModel> {
    let mut seen = HashSet::new();
    let mut deduped = Vec::with_capacity(models.len());
    for model in models {
        if seen.insert(model.service_name.clone()) {
            deduped.push(model);
        } else {
            diagnostics.push(
                Diagnostic::error(
                    "extract",
                    format!(
                        "duplicate service name '{}'; first occurrence wins",
                        model.service_name
                    ),
                )
                .for_step(&model.service_name),
            );
        }
    }
    deduped
}

#[cfg(test)]
mod tests {
    use flowgen_definition::InterfaceKind;
    use flowgen_model::{Cardinality, StreamingShape};

    use super::*;
    use crate::symbols::TypeSymbol;

    const DELEGATE: &str = "com.acme.legacy.Enricher";
    const WIRE_IN: &str = "com.acme.wire.Order";
    const WIRE_OUT: &str = "com.acme.wire.EnrichedOrder";
    const DOMAIN_IN: &str = "com.acme.model.Order";
    const DOMAIN_OUT: &str = "com.acme.model.EnrichedOrder";

    fn delegate_table() -> SymbolTable {
        let mut table = SymbolTable::new();
        table.insert(
            TypeSymbol::new(DELEGATE)
                .with_interface(InterfaceKind::UnaryOperator, &[WIRE_IN, WIRE_OUT]),
        );
        table
    }

    fn delegated_declaration() -> StepDeclaration {
        let mut declaration = StepDeclaration::internal("enrich", "com.acme.EnrichFacade");
        declaration.delegate = Some(TypeRef::new(DELEGATE));
        declaration
    }

    fn extract(
        declaration: &StepDeclaration,
        symbols: &SymbolTable,
        fallback_enabled: bool,
    ) -> std::result::Result<Extracted, Diagnostic> {
        extract_step(declaration, symbols, TransportMode::Grpc, fallback_enabled)
    }

    #[test]
    fn test_delegated_types_inferred_from_signature() {
        let extracted =
            extract(&delegated_declaration(), &delegate_table(), false).expect("should extract");
        let model = extracted.model;

        assert_eq!(model.streaming, StreamingShape::UnaryUnary);
        assert_eq!(model.input.domain_type.qualified(), WIRE_IN);
        assert_eq!(model.output.domain_type.qualified(), WIRE_OUT);
        assert!(!model.input.requires_mapping);
        assert!(model.external_mapper.is_none());
        assert_eq!(model.mapper_fallback, MapperFallback::None);
    }

    #[test]
    fn test_delegate_not_found_is_an_error() {
        let result = extract(&delegated_declaration(), &SymbolTable::new(), false);
        let diagnostic = result.err().expect("extraction should fail");
        assert!(diagnostic.severity.is_error());
        assert!(diagnostic.message.contains("not found"));
        assert_eq!(diagnostic.step.as_deref(), Some("enrich"));
    }

    #[test]
    fn test_delegate_without_operator_interface_is_an_error() {
        let mut table = SymbolTable::new();
        table.insert(TypeSymbol::new(DELEGATE));

        let diagnostic = extract(&delegated_declaration(), &table, false)
            .err()
            .expect("extraction should fail");
        assert!(diagnostic.message.contains("none of the recognized"));
    }

    #[test]
    fn test_ambiguous_delegate_interfaces_is_an_error() {
        let mut table = SymbolTable::new();
        table.insert(
            TypeSymbol::new(DELEGATE)
                .with_interface(InterfaceKind::UnaryOperator, &[WIRE_IN, WIRE_OUT])
                .with_interface(InterfaceKind::ServerStreamOperator, &[WIRE_IN, WIRE_OUT]),
        );

        let diagnostic = extract(&delegated_declaration(), &table, false)
            .err()
            .expect("extraction should fail");
        assert!(diagnostic.message.contains("ambiguously"));
    }

    #[test]
    fn test_differing_types_without_mapper_is_an_error() {
        let mut declaration = delegated_declaration();
        declaration.input = Some(TypeRef::new(DOMAIN_IN));
        declaration.output = Some(TypeRef::new(DOMAIN_OUT));

        let diagnostic = extract(&declaration, &delegate_table(), false)
            .err()
            .expect("extraction should fail");
        assert!(diagnostic.message.contains("no mapper"));
    }

    #[test]
    fn test_explicit_mapper_with_exact_args_resolves() {
        let mut table = delegate_table();
        table.insert(TypeSymbol::new("com.acme.map.OrderMapper").with_interface(
            InterfaceKind::TypeMapper,
            &[DOMAIN_IN, WIRE_IN, DOMAIN_OUT, WIRE_OUT],
        ));

        let mut declaration = delegated_declaration();
        declaration.input = Some(TypeRef::new(DOMAIN_IN));
        declaration.output = Some(TypeRef::new(DOMAIN_OUT));
        declaration.mapper = Some(TypeRef::new("com.acme.map.OrderMapper"));

        let model = extract(&declaration, &table, false)
            .expect("should extract")
            .model;
        assert_eq!(
            model.external_mapper.as_ref().map(|m| m.qualified()),
            Some("com.acme.map.OrderMapper")
        );
        assert!(model.input.requires_mapping);
        assert_eq!(model.input.native_type.as_ref().map(|t| t.qualified()), Some(WIRE_IN));
    }

    #[test]
    fn test_explicit_mapper_with_wrong_args_is_an_error() {
        let mut table = delegate_table();
        table.insert(TypeSymbol::new("com.acme.map.OrderMapper").with_interface(
            InterfaceKind::TypeMapper,
            &[DOMAIN_IN, WIRE_IN, DOMAIN_OUT, "com.acme.wire.Wrong"],
        ));

        let mut declaration = delegated_declaration();
        declaration.input = Some(TypeRef::new(DOMAIN_IN));
        declaration.output = Some(TypeRef::new(DOMAIN_OUT));
        declaration.mapper = Some(TypeRef::new("com.acme.map.OrderMapper"));

        let diagnostic = extract(&declaration, &table, false)
            .err()
            .expect("extraction should fail");
        assert!(diagnostic.message.contains("requires"));
    }

    #[test]
    fn test_unique_mapper_inference() {
        let mut table = delegate_table();
        table.insert(TypeSymbol::new("com.acme.map.OrderMapper").with_interface(
            InterfaceKind::TypeMapper,
            &[DOMAIN_IN, WIRE_IN, DOMAIN_OUT, WIRE_OUT],
        ));

        let mut declaration = delegated_declaration();
        declaration.input = Some(TypeRef::new(DOMAIN_IN));
        declaration.output = Some(TypeRef::new(DOMAIN_OUT));

        let model = extract(&declaration, &table, false)
            .expect("should extract")
            .model;
        assert_eq!(
            model.external_mapper.as_ref().map(|m| m.qualified()),
            Some("com.acme.map.OrderMapper")
        );
    }

    #[test]
    fn test_ambiguous_mapper_inference_is_an_error() {
        let mut table = delegate_table();
        for name in ["com.acme.map.AMapper", "com.acme.map.BMapper"] {
            table.insert(TypeSymbol::new(name).with_interface(
                InterfaceKind::TypeMapper,
                &[DOMAIN_IN, WIRE_IN, DOMAIN_OUT, WIRE_OUT],
            ));
        }

        let mut declaration = delegated_declaration();
        declaration.input = Some(TypeRef::new(DOMAIN_IN));
        declaration.output = Some(TypeRef::new(DOMAIN_OUT));

        let diagnostic = extract(&declaration, &table, false)
            .err()
            .expect("extraction should fail");
        assert!(diagnostic.message.contains("ambiguous mapper"));
    }

    #[test]
    fn test_serialization_fallback_when_enabled_and_requested() {
        let mut declaration = delegated_declaration();
        declaration.input = Some(TypeRef::new(DOMAIN_IN));
        declaration.output = Some(TypeRef::new(DOMAIN_OUT));
        declaration.mapper_fallback = MapperFallback::Serialize;

        // Fallback disabled globally: still an error
        assert!(extract(&declaration, &delegate_table(), false).is_err());

        // Enabled globally and requested by the step: fallback substitutes
        let model = extract(&declaration, &delegate_table(), true)
            .expect("should extract")
            .model;
        assert!(model.external_mapper.is_none());
        assert_eq!(model.mapper_fallback, MapperFallback::Serialize);
    }

    #[test]
    fn test_internal_step_infers_types_from_implementation() {
        let mut table = SymbolTable::new();
        table.insert(
            TypeSymbol::new("com.acme.EnrichService")
                .with_interface(InterfaceKind::UnaryOperator, &[DOMAIN_IN, DOMAIN_OUT]),
        );

        let mut declaration = StepDeclaration::internal("enrich", "com.acme.EnrichService");
        declaration.cardinality = Cardinality::OneToMany;

        let model = extract(&declaration, &table, false)
            .expect("should extract")
            .model;
        assert_eq!(model.input.domain_type.qualified(), DOMAIN_IN);
        assert_eq!(model.output.domain_type.qualified(), DOMAIN_OUT);
        // Internal steps take their shape from the declared cardinality
        assert_eq!(model.streaming, StreamingShape::UnaryStreaming);
    }

    #[test]
    fn test_internal_identity_forced_from_declaration() {
        let mut table = SymbolTable::new();
        table.insert(
            TypeSymbol::new("com.acme.EnrichService")
                .with_interface(InterfaceKind::UnaryOperator, &[DOMAIN_IN, DOMAIN_OUT])
                .with_identity("self-styled", "com.elsewhere"),
        );

        let declaration = StepDeclaration::internal("enrich", "com.acme.EnrichService");
        let extracted = extract(&declaration, &table, false).expect("should extract");

        assert_eq!(extracted.model.service_name, "enrich");
        assert_eq!(extracted.model.service_package, "com.acme");
        // The override is surfaced as a note
        assert_eq!(extracted.diagnostics.len(), 1);
        assert_eq!(
            extracted.diagnostics[0].severity,
            crate::pipeline::Severity::Note
        );
    }

    #[test]
    fn test_dedup_first_occurrence_wins() {
        let mut table = SymbolTable::new();
        table.insert(
            TypeSymbol::new("com.acme.First")
                .with_interface(InterfaceKind::UnaryOperator, &[DOMAIN_IN, DOMAIN_OUT]),
        );
        table.insert(
            TypeSymbol::new("com.acme.Second")
                .with_interface(InterfaceKind::UnaryOperator, &[DOMAIN_IN, DOMAIN_OUT]),
        );

        let first = extract(
            &StepDeclaration::internal("enrich", "com.acme.First"),
            &table,
            false,
        )
        .expect("should extract")
        .model;
        let second = extract(
            &StepDeclaration::internal("enrich", "com.acme.Second"),
            &table,
            false,
        )
        .expect("should extract")
        .model;

        let mut diagnostics = Vec::new();
        let deduped = dedup_by_service_name(vec![first, second], &mut diagnostics);

        assert_eq!(deduped.len(), 1);
        assert_eq!(deduped[0].service_type.qualified(), "com.acme.First");
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].severity.is_error());
    }
}
