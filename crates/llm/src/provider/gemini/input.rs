use crate::protocol::{
    anthropic::messages::{self, SystemPrompt, ToolChoice},
    gemini::{
        Content, FunctionCallingConfig, FunctionCallingMode, FunctionDeclaration, GenerateContentRequest,
        GenerationConfig, Schema, SchemaType, Tool, ToolConfig,
    },
};

use super::{build_contents, json_number, translate};

/// Builds the `generateContent` body for a Messages request.
///
/// Parts of the request that cannot be expressed are left out rather than
/// failing: a tool with an unusable schema is declared without parameters and
/// non-numeric sampling parameters are not forwarded.
pub fn build_native_request(request: &messages::Request) -> GenerateContentRequest {
    let (contents, _) = build_contents(&request.messages);

    let system_instruction = request
        .system
        .as_ref()
        .and_then(SystemPrompt::text)
        .map(Content::text);

    let declarations: Vec<FunctionDeclaration> = request.tools.iter().flatten().filter_map(declaration).collect();

    let tools = (!declarations.is_empty()).then(|| {
        vec![Tool {
            function_declarations: declarations,
        }]
    });

    let tool_config = match tools {
        Some(_) => request.tool_choice.as_ref().and_then(tool_config),
        None => None,
    };

    let generation_config = generation_config(request);

    GenerateContentRequest {
        contents,
        system_instruction,
        tools,
        tool_config,
        generation_config: (!generation_config.is_empty()).then_some(generation_config),
    }
}

/// URL of the `generateContent` method for `model`.
///
/// Accepts base URLs with or without the trailing `/models` segment and model
/// ids with or without the `models/` resource prefix.
pub fn native_url(base_url: &str, model: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let model = model.strip_prefix("models/").unwrap_or(model);

    if base.ends_with("/models") {
        format!("{base}/{model}:generateContent")
    } else {
        format!("{base}/models/{model}:generateContent")
    }
}

fn declaration(tool: &messages::Tool) -> Option<FunctionDeclaration> {
    if tool.name.is_empty() {
        return None;
    }

    let parameters = tool.input_schema.as_ref().and_then(translate).filter(has_parameters);

    if parameters.is_none() && tool.input_schema.is_some() {
        log::debug!("Declaring tool '{}' without parameters", tool.name);
    }

    Some(FunctionDeclaration {
        name: tool.name.clone(),
        description: tool.description.clone().filter(|description| !description.is_empty()),
        parameters,
    })
}

/// Gemini rejects parameter schemas that are not objects or declare nothing.
fn has_parameters(schema: &Schema) -> bool {
    schema.r#type == SchemaType::Object && schema.properties.as_ref().is_some_and(|properties| !properties.is_empty())
}

fn tool_config(choice: &ToolChoice) -> Option<ToolConfig> {
    let (mode, allowed_function_names) = match choice {
        ToolChoice::Auto { .. } => (FunctionCallingMode::Auto, None),
        ToolChoice::Any { .. } => (FunctionCallingMode::Any, None),
        ToolChoice::Tool { name, .. } => (FunctionCallingMode::Any, Some(vec![name.clone()])),
        ToolChoice::None { .. } => (FunctionCallingMode::None, None),
        ToolChoice::Unknown(_) => return None,
    };

    Some(ToolConfig {
        function_calling_config: FunctionCallingConfig {
            mode,
            allowed_function_names,
        },
    })
}

fn generation_config(request: &messages::Request) -> GenerationConfig {
    GenerationConfig {
        max_output_tokens: request.max_tokens.and_then(json_number),
        temperature: request.temperature.and_then(json_number),
        top_p: request.top_p.and_then(json_number),
        top_k: request.top_k.and_then(json_number),
        stop_sequences: request
            .stop_sequences
            .clone()
            .filter(|sequences| !sequences.is_empty()),
    }
}
