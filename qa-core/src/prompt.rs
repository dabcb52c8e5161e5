//! Prompt templates for test execution and AI exploration/generation.

use crate::provider::ExecuteTestInput;

/// The prompt sent to the browser-driving agent for a single test case.
pub fn build_test_prompt(input: &ExecuteTestInput) -> String {
    let expected = input
        .expected_outcome
        .as_deref()
        .unwrap_or("No explicit expected outcome was provided; use your judgment.");

    let account_block = match (&input.account_email, &input.account_password) {
        (Some(email), Some(password)) => match &input.profile_id {
            Some(_) => format!(
                "You already have an authenticated browser profile for this account \
                ({email}); the session should still be logged in, so confirm you are \
                authenticated before proceeding. If the session has expired, log in again \
                with email \"{email}\" and password \"{password}\".",
            ),
            None => format!(
                "Log in before the test using email \"{email}\" and password \"{password}\".",
            ),
        },
        _ => "No account credentials were provided; proceed as an anonymous visitor.".to_string(),
    };

    let metadata_line = if input.metadata.is_empty() {
        String::new()
    } else {
        let pairs: Vec<String> = input
            .metadata
            .iter()
            .map(|(k, v)| format!("{k}={}", value_as_plain_string(v)))
            .collect();
        format!("Account info: {}\n", pairs.join(", "))
    };

    format!(
        "You are testing the website at {url}.\n\
        Test case: {title}\n\
        {account_block}\n\
        {metadata_line}\
        IMPORTANT: If at any point you see an error screen, stop and fail the test.\n\
        After confirming authentication, proceed with: {description}\n\
        Expected outcome: {expected}\n\n\
        When you finish, respond with a single JSON object of the shape:\n\
        {{\"success\": true|false, \"reason\": \"...\", \"extractedData\": {{}}}}\n\
        `success` must be true only if the expected outcome was actually observed.",
        url = input.website_url,
        title = input.title,
        description = input.description,
    )
}

fn value_as_plain_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// The prompt used to ask an LLM to verify an ambiguous test result a second time, as a
/// fallback when the first verdict extraction came back inconclusive.
pub fn build_verification_prompt(title: &str, expected: &str, transcript: &str) -> String {
    format!(
        "A browser agent just attempted this test case: {title}\n\
        Expected outcome: {expected}\n\
        Here is what it reported:\n{transcript}\n\n\
        Based only on this transcript, did the test pass? Respond with a single JSON object:\n\
        {{\"success\": true|false, \"reason\": \"...\"}}"
    )
}

/// The prompt used by the AI generation pipeline to turn free-form text plus a live
/// exploration session into a batch of candidate test case drafts.
pub fn build_exploration_prompt(website_url: &str, raw_text: &str) -> String {
    format!(
        "You are exploring the website at {website_url} to design test cases from this\n\
        description of what a user cares about:\n\n{raw_text}\n\n\
        Explore the site as needed, then propose between 1 and 10 concrete, independently\n\
        runnable test cases. Respond with a single JSON object of the shape:\n\
        {{\"testCases\": [{{\"title\": \"...\", \"description\": \"...\", \"expectedOutcome\": \"...\"}}]}}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_includes_title_url_and_credentials() {
        let input = ExecuteTestInput {
            test_case_id: "tc-1".into(),
            title: "Login succeeds".into(),
            description: "Enter credentials and submit".into(),
            expected_outcome: Some("Dashboard is shown".into()),
            website_url: "https://example.com".into(),
            account_email: Some("user@example.com".into()),
            account_password: Some("secret".into()),
            profile_id: None,
            metadata: Default::default(),
        };
        let prompt = build_test_prompt(&input);
        assert!(prompt.contains("https://example.com"));
        assert!(prompt.contains("Login succeeds"));
        assert!(prompt.contains("user@example.com"));
        assert!(prompt.contains("secret"));
        assert!(prompt.contains("stop and fail the test"));
        assert!(prompt.contains("Log in before the test"));
    }

    #[test]
    fn test_prompt_with_profile_id_offers_reuse_before_fallback_login() {
        let input = ExecuteTestInput {
            test_case_id: "tc-1".into(),
            title: "Checkout as returning customer".into(),
            description: "Add an item to the cart and check out".into(),
            expected_outcome: Some("Order confirmation is shown".into()),
            website_url: "https://example.com".into(),
            account_email: Some("user@example.com".into()),
            account_password: Some("secret".into()),
            profile_id: Some("profile-123".into()),
            metadata: Default::default(),
        };
        let prompt = build_test_prompt(&input);
        assert!(prompt.contains("already have an authenticated browser profile"));
        assert!(prompt.contains("secret"));
    }

    #[test]
    fn test_prompt_includes_account_metadata_line() {
        let mut metadata = serde_json::Map::new();
        metadata.insert("plan".to_string(), serde_json::Value::String("pro".to_string()));
        let input = ExecuteTestInput {
            test_case_id: "tc-1".into(),
            title: "Check plan badge".into(),
            description: "Open the account page".into(),
            expected_outcome: None,
            website_url: "https://example.com".into(),
            account_email: Some("user@example.com".into()),
            account_password: Some("secret".into()),
            profile_id: None,
            metadata,
        };
        let prompt = build_test_prompt(&input);
        assert!(prompt.contains("Account info: plan=pro"));
    }

    #[test]
    fn test_prompt_without_account_says_anonymous() {
        let input = ExecuteTestInput {
            test_case_id: "tc-1".into(),
            title: "Browse as guest".into(),
            description: "Visit homepage".into(),
            expected_outcome: None,
            website_url: "https://example.com".into(),
            account_email: None,
            account_password: None,
            profile_id: None,
            metadata: Default::default(),
        };
        let prompt = build_test_prompt(&input);
        assert!(prompt.contains("anonymous visitor"));
    }
}
