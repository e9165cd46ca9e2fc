use tickwise_models::{AgentKind, TaskId};

use crate::engine::CompletionRequest;

/// Default role label for an agent kind.
pub fn default_role(kind: AgentKind) -> &'static str {
    match kind {
        AgentKind::Price => "Price Analyst",
        AgentKind::News => "News Researcher",
        AgentKind::Sentiment => "Sentiment Analyst",
        AgentKind::Recommendation => "Recommendation Specialist",
    }
}

pub fn default_goal(kind: AgentKind) -> &'static str {
    match kind {
        AgentKind::Price => "Analyze price trends for a valid ticker.",
        AgentKind::News => "Find and summarize the latest news about a stock ticker.",
        AgentKind::Sentiment => "Analyze sentiment of news articles.",
        AgentKind::Recommendation => {
            "Analyze price and sentiment data to provide a Buy/Sell/Hold recommendation \
             with a short explanation in JSON format."
        }
    }
}

pub fn backstory(kind: AgentKind) -> String {
    match kind {
        AgentKind::Price => "A financial analyst skilled in analyzing stock price data.".to_string(),
        AgentKind::News => "An expert in financial news research, skilled at finding and \
                            summarizing relevant news articles for stock analysis."
            .to_string(),
        AgentKind::Sentiment => sentiment_backstory(),
        AgentKind::Recommendation => format!(
            "A senior analyst who synthesizes all data to make actionable investment \
             recommendations. Always output a JSON object with fields: {}.",
            recommendation_fields()
        ),
    }
}

fn sentiment_backstory() -> String {
    "You are an expert in sentiment analysis for financial news and market data. \
     You understand context, nuance, sarcasm, and implicit sentiment in financial reporting. \
     You can identify subtle indicators of market sentiment in text that might not use \
     obvious sentiment words.\n\n\
     When analyzing sentiment:\n\
     1. Consider the overall tone (positive, negative, or neutral)\n\
     2. Identify key phrases that signal sentiment\n\
     3. Recognize financial context and industry-specific language\n\
     4. Assess the implied sentiment beyond just the words used\n\
     5. Quantify sentiment on a scale from -1.0 (very negative) to 1.0 (very positive)\n\n\
     Always provide reasoning for your sentiment assessments and highlight specific phrases \
     that influenced your analysis."
        .to_string()
}

fn recommendation_fields() -> &'static str {
    "'ticker', 'action' (Buy/Sell/Hold), 'explanation', and 'references' (list of sources)"
}

/// Instruction and expected-output text for each stage of the stock pipeline.
pub fn task_texts(kind: AgentKind, symbol: &str) -> (String, String) {
    match kind {
        AgentKind::Price => (
            format!("Fetch recent price data for {symbol}."),
            "A summary of price data.".to_string(),
        ),
        AgentKind::News => (
            format!("Find and summarize the latest news about {symbol}."),
            "A summary of the top 3 news articles with links.".to_string(),
        ),
        AgentKind::Sentiment => (
            "Analyze the sentiment of the summarized news articles.".to_string(),
            "A sentiment score and summary.".to_string(),
        ),
        AgentKind::Recommendation => (
            format!(
                "Given the price summary and sentiment score for {symbol}, provide a final \
                 investment recommendation. Output a JSON object with: {}. \
                 Be concise and base your answer on the provided analysis.",
                recommendation_fields()
            ),
            "A JSON object with the recommendation and explanation.".to_string(),
        ),
    }
}

pub fn render_system_prompt(request: &CompletionRequest) -> String {
    let tools = if request.tools.is_empty() {
        "None. Rely on your own reasoning and the supplied context.".to_string()
    } else {
        request
            .tools
            .iter()
            .map(|t| format!("- {t} (already run; output supplied below)"))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "You are the {role}.\n\n\
         ## GOAL\n\n{goal}\n\n\
         ## BACKSTORY\n\n{backstory}\n\n\
         ## TOOLS\n\n{tools}",
        role = request.role,
        goal = request.goal,
        backstory = request.backstory.trim(),
    )
}

/// Render the task, tool outputs and upstream context as the user prompt.
/// Context sections keep dependency-declaration order.
pub fn render_user_prompt(request: &CompletionRequest) -> String {
    let mut prompt = format!(
        "## TASK\n\n{}\n\n## EXPECTED OUTPUT\n\n{}\n",
        request.instruction, request.expected_output
    );

    if let Some(plan) = &request.plan {
        prompt.push_str(&format!("\n## PLAN\n\n{plan}\n"));
    }

    if !request.tool_outputs.is_empty() {
        prompt.push_str("\n## TOOL OUTPUTS\n");
        for output in &request.tool_outputs {
            let body = serde_json::to_string_pretty(&output.payload)
                .unwrap_or_else(|_| output.payload.to_string());
            prompt.push_str(&format!("\n### {}\n\n```json\n{body}\n```\n", output.tool));
        }
    }

    if !request.context.is_empty() {
        prompt.push_str("\n## CONTEXT\n");
        for entry in &request.context {
            prompt.push_str(&format!(
                "\n### Output of task `{}`\n\n{}\n",
                entry.source,
                entry.payload.render()
            ));
        }
    }

    prompt
}

/// Build the one-shot planning request for a run.
///
/// `steps` lists (task id, agent role, instruction) in execution order.
pub fn planning_request(subject: &str, steps: &[(TaskId, String, String)]) -> CompletionRequest {
    let listing = steps
        .iter()
        .enumerate()
        .map(|(i, (id, role, instruction))| {
            format!("{}. `{id}` ({role}): {instruction}", i + 1)
        })
        .collect::<Vec<_>>()
        .join("\n");

    let example = serde_json::Value::Object(
        steps
            .iter()
            .map(|(id, _, _)| (id.to_string(), "<one or two sentences>".into()))
            .collect(),
    );

    CompletionRequest {
        role: "Pipeline Planner".to_string(),
        goal: "Write a short step-by-step plan for each task of a stock analysis run."
            .to_string(),
        backstory: "You coordinate a team of analysts. You never change the order of the \
                    tasks; you only add guidance that helps each analyst do its part well."
            .to_string(),
        tools: Vec::new(),
        instruction: format!(
            "The analysis of {subject} runs these tasks in this fixed order:\n\n{listing}\n\n\
             Respond with a single JSON object mapping each task id to its plan note."
        ),
        expected_output: serde_json::to_string_pretty(&example).unwrap_or_default(),
        plan: None,
        tool_outputs: Vec::new(),
        context: Vec::new(),
    }
}
