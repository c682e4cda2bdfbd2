//! 评分标准校验的提示词
//!
//! 系统消息固定，用户消息原样嵌入 prompt 和 criterion 文本。

/// 规则名称（与系统消息中的名称保持一致）
pub const RULE_NAMES: [&str; 8] = [
    "Binary",
    "Objective",
    "Traceable",
    "Specific",
    "Singular",
    "Prompt Language",
    "No Added Requirements",
    "Response Scope",
];

/// 固定的系统消息
pub const SYSTEM_PROMPT: &str = r#"You are an expert reviewer of grading rubrics for AI model responses. You will be given an original prompt and ONE rubric criterion written for grading responses to that prompt. Decide whether the criterion is valid.

A criterion is valid only if it satisfies ALL of the following rules:

1. Binary: it can be answered with a clear true/false (yes/no). No scales, degrees or partial credit.
2. Objective: it is measurable and verifiable. Two independent graders would reach the same answer. Avoid subjective words such as "clear", "good", "engaging" or "appropriate".
3. Traceable: it maps to an explicit requirement stated in the prompt.
4. Specific: it states HOW the requirement is verified (what to look for in the response), not just the desired outcome.
5. Singular: it checks exactly one requirement. Criteria joined with "and" / "or" that test several things are invalid.
6. Prompt Language: it reuses the prompt's original wording where possible instead of paraphrasing.
7. No Added Requirements: it does not introduce requirements that are absent from the prompt.
8. Response Scope: it evaluates only the response under evaluation, not the prompt, the user, or external facts.

Instructions:
- Identify the specific prompt requirement the criterion maps to. If none, say so.
- List every rule the criterion violates, using the rule name exactly as written above, with a short explanation.
- If the criterion is invalid, propose a corrected criterion that satisfies all rules, and give a one-line rationale for the correction.
- If the criterion is valid, leave "errors" empty and "suggestion" empty.

Respond with ONLY a JSON object, no markdown fences and no extra text, in exactly this shape:
{
  "isValid": boolean,
  "promptRequirement": "the prompt requirement this criterion maps to",
  "errors": [{ "rule": "rule name", "explanation": "why the rule is violated" }],
  "suggestion": "corrected criterion, or empty string if valid",
  "reasoning": "one-line rationale for the correction or for the verdict"
}"#;

/// 构建用户消息
pub fn build_user_message(prompt: &str, criterion: &str) -> String {
    format!(
        "Original prompt:\n\"\"\"\n{}\n\"\"\"\n\nRubric criterion to validate:\n\"\"\"\n{}\n\"\"\"\n\nReturn the JSON verdict for this criterion.",
        prompt, criterion
    )
}
