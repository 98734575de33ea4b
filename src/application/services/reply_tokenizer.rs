/// Splits a reply into whitespace-delimited tokens for streaming.
///
/// Every token keeps the whitespace run that followed it in the reply, so the
/// concatenation of all tokens reproduces the reply byte for byte. Leading
/// whitespace, if any, is folded into the first token.
pub fn tokenize_reply(reply: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut has_word = false;
    let mut after_word_space = false;

    for ch in reply.chars() {
        if ch.is_whitespace() {
            after_word_space = has_word;
        } else {
            if after_word_space {
                tokens.push(std::mem::take(&mut current));
                after_word_space = false;
            }
            has_word = true;
        }
        current.push(ch);
    }

    if !current.is_empty() {
        tokens.push(current);
    }

    tokens
}
