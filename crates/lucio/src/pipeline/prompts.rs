//! Prompt templates for the model calls each stage makes.

const PLANNING_INSTRUCTIONS: &str = "\
You are the planner. Decide how the request below should be carried out; do not carry it out.

Produce a short numbered plan. One concise, actionable step per line. State any assumption you make.
No explanations, no generated content, only strategy and ordering.";

const PERCEPTION_INSTRUCTIONS: &str = "\
You are looking at a screenshot of the user's screen. Your main job is to find the URL of the page being viewed.

The URL is usually in the browser address bar at the top of the window. It may also appear in a tab title, \
in the page text, or in a visible link.

Answer in exactly this format:
1. Description: <one or two sentences about what is on screen>
2. URL: <the URL exactly as shown, e.g. example.com or https://example.com/page>
3. Keywords: <relevant keywords>
4. Intent: <what the user most likely wants>

Always include the URL line. If you see any domain name at all, write it. If there is truly none, write URL: N/A";

const DIRECTIVE_PERCEPTION_INSTRUCTIONS: &str = "\
Look only at the browser address bar and any visible link or domain name in this screenshot.
Reply with a single line of the form
URL: <address>
and nothing else. Copy the address exactly as shown. If no address is visible at all, reply URL: N/A";

const WEB_INSTRUCTIONS: &str = "\
You work with web page content. Pull out the information relevant to the user's request.
Do not invent anything the page does not say. Use bullet points where they help.";

const CONTENT_INSTRUCTIONS: &str = "\
Turn the content below into a polished, readable document that will be printed to PDF.

- Organise it with headings written as \"## Heading\"
- Write complete paragraphs; use \"- \" lists where appropriate
- Keep every fact from the source accurate

Output only the document itself. No preamble such as \"Here is the content\", no commentary.";

pub fn planning(request: &str) -> String {
    format!(
        "{PLANNING_INSTRUCTIONS}\n\nUSER REQUEST: {request}\n\n\
         The available steps are:\n\
         1. Analyze the current screen\n\
         2. Extract the relevant information\n\
         3. Summarize the content\n\
         4. Generate a PDF\n\n\
         Provide a brief execution plan."
    )
}

pub fn perception(query: &str) -> String {
    format!(
        "{PERCEPTION_INSTRUCTIONS}\n\nUSER QUERY: {query}\n\n\
         Analyze the screenshot together with the user query."
    )
}

pub fn perception_directive(query: &str) -> String {
    format!("{DIRECTIVE_PERCEPTION_INSTRUCTIONS}\n\nThe user asked: {query}")
}

pub fn web(request: &str, title: &str, content: &str) -> String {
    format!(
        "{WEB_INSTRUCTIONS}\n\nUSER REQUEST: {request}\nPAGE TITLE: {title}\nPAGE CONTENT: {content}\n\n\
         Extract and format the information most relevant to the request."
    )
}

pub fn content(request: &str, content: &str) -> String {
    format!(
        "{CONTENT_INSTRUCTIONS}\n\nUSER REQUEST: {request}\nSOURCE CONTENT: {content}"
    )
}
