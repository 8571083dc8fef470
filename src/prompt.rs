use crate::item::WorkItem;
use crate::mindmap::{MindMap, MindMapNode};

/// Builds the generation prompt for one item, embedding an example of the
/// exact JSON shape the reply must follow.
pub fn build_prompt(item: &WorkItem) -> String {
    let WorkItem { subject, topic } = item;

    let example = MindMap {
        main_topic: topic.clone(),
        sub_topics: vec![
            MindMapNode {
                title: "Subtopic Title 1".into(),
                description: "Brief explanation of the subtopic.".into(),
            },
            MindMapNode {
                title: "Subtopic Title 2".into(),
                description: "Another explanation of a different subtopic.".into(),
            },
        ],
    };
    // Serializing a struct of plain strings cannot fail.
    let example = serde_json::to_string_pretty(&example).unwrap_or_default();

    format!(
        "You are a professional teacher in {subject}.\n\
         Your goal is to generate a mind map for the subject above with the focus on the topic \
         \"{topic}\" so that a student can improve their understanding of {subject} and \"{topic}\" \
         while using that mind map.\n\
         The mind map should feature sub-topics of the topic \"{topic}\" and no other content.\n\
         The result of your work must be a mind map in the form of JSON using the following data \
         structure:\n\
         \n\
         ```json\n\
         {example}\n\
         ```\n\
         \n\
         The JSON structure above must be strictly followed in your response.\n\
         Do not include any explanations or additional text. Only return valid JSON."
    )
    .trim()
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mindmap::parse_mind_map;

    #[test]
    fn prompt_names_subject_and_topic() {
        let prompt = build_prompt(&WorkItem::new("Math", "Algebra"));
        assert!(prompt.starts_with("You are a professional teacher in Math."));
        assert!(prompt.contains(r#"focus on the topic "Algebra""#));
        assert!(prompt.contains(r#"sub-topics of the topic "Algebra""#));
    }

    #[test]
    fn embedded_example_is_valid_mind_map() {
        let prompt = build_prompt(&WorkItem::new("Science", "Biology"));
        let example = parse_mind_map(&prompt).unwrap();
        assert_eq!(example.main_topic, "Biology");
        assert_eq!(example.sub_topics.len(), 2);
    }

    #[test]
    fn prompt_is_trimmed() {
        let prompt = build_prompt(&WorkItem::new("History", "Rome"));
        assert_eq!(prompt, prompt.trim());
        assert!(prompt.ends_with("Only return valid JSON."));
    }
}
