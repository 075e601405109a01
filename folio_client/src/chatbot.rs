//! Canned assistant answering common questions about the portfolio owner.
//!
//! The first rule matching the normalized input wins. Anything else gets the
//! fallback reply.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reply {
    pub text: &'static str,
    pub quick_replies: &'static [&'static str],
}

#[derive(Debug, Clone, Copy)]
enum Pattern {
    /// The input starts with one of the words.
    StartsWith(&'static [&'static str]),
    /// The input contains one of the words.
    Contains(&'static [&'static str]),
}

impl Pattern {
    fn matches(self, input: &str) -> bool {
        match self {
            Self::StartsWith(words) => words.iter().any(|w| input.starts_with(w)),
            Self::Contains(words) => words.iter().any(|w| input.contains(w)),
        }
    }
}

const MAIN_TOPICS: &[&str] = &["About", "Projects", "Skills", "Contact"];

pub const WELCOME: Reply = Reply {
    text: "Hello! I'm the portfolio assistant. The owner is away right now, but I can \
           tell you about their work, projects and skills.",
    quick_replies: &["Tell me about the owner", "Show me projects", "Contact information", "Skills & Experience"],
};

pub const FALLBACK: Reply = Reply {
    text: "Hmm, I didn't quite get that. You can ask about:\n\
           - the owner\n\
           - projects\n\
           - technical skills\n\
           - contact information\n\
           - education and certificates",
    quick_replies: MAIN_TOPICS,
};

const RULES: &[(Pattern, Reply)] = &[
    (
        Pattern::StartsWith(&["hi", "hello", "hey", "namaste", "hii", "hlo"]),
        Reply {
            text: "Hello! The owner isn't available right now, but I'm happy to help. \
                   What would you like to know?",
            quick_replies: MAIN_TOPICS,
        },
    ),
    (
        Pattern::Contains(&["about", "who", "owner"]),
        Reply {
            text: "The owner is a web developer and graphics designer working on web \
                   development, UI/UX design, 3D modeling and graphics design.",
            quick_replies: &["View Projects", "Technical Skills", "Education", "Contact"],
        },
    ),
    (
        Pattern::Contains(&["project", "work", "portfolio"]),
        Reply {
            text: "The projects section shows the featured work, from web apps and UI \
                   designs to 3D models. Scroll down to take a look!",
            quick_replies: &["View Live Demos", "GitHub Profile", "More Info"],
        },
    ),
    (
        Pattern::Contains(&["skill", "technology", "tech", "know"]),
        Reply {
            text: "Skills cover web development (HTML, CSS, JavaScript), design tools \
                   (Figma, Photoshop, Illustrator) and 3D work (Blender, 3DS Max).",
            quick_replies: &["Projects", "Certificates", "Contact"],
        },
    ),
    (
        Pattern::Contains(&["contact", "email", "phone", "reach"]),
        Reply {
            text: "The fastest way to get in touch is the contact form. Your message is \
                   forwarded to the owner by email.",
            quick_replies: &["Fill Contact Form", "More Info"],
        },
    ),
    (
        Pattern::Contains(&["education", "study", "degree"]),
        Reply {
            text: "The education section lists degrees and schools along with the \
                   specializations.",
            quick_replies: &["Certificates", "Skills", "Projects"],
        },
    ),
    (
        Pattern::Contains(&["certificate", "achievement"]),
        Reply {
            text: "Certifications include computer graphics, web development, data \
                   analytics and more. Check the portfolio for the full list.",
            quick_replies: &["View All", "Projects", "Contact"],
        },
    ),
    (
        Pattern::Contains(&["available", "free", "hire"]),
        Reply {
            text: "The owner is available for freelance projects and full time \
                   opportunities. Fill in the contact form and expect a reply within \
                   24 to 48 hours.",
            quick_replies: &["Contact Now", "View Projects"],
        },
    ),
    (
        Pattern::Contains(&["help", "option"]),
        Reply {
            text: "I can tell you about the owner, show projects, list skills, education \
                   and certificates, share contact information or talk about hiring.",
            quick_replies: MAIN_TOPICS,
        },
    ),
];

pub fn normalize(input: &str) -> String {
    input.trim().to_lowercase()
}

/// Answer a chat message. Blank messages get no reply.
pub fn respond(input: &str) -> Option<Reply> {
    let input = normalize(input);
    if input.is_empty() {
        return None;
    }

    let reply = RULES
        .iter()
        .find(|(pattern, _)| pattern.matches(&input))
        .map_or(FALLBACK, |&(_, reply)| reply);
    Some(reply)
}
