use std::{
	fs,
	io::{self, Read},
	path::Path,
};

use select::{
	document::Document,
	node::{Data, Node},
	predicate::Name,
};

/// Elements whose text ends a line.
const BLOCK_ELEMENTS: &[&str] = &[
	"address", "article", "blockquote", "br", "dd", "div", "dl", "dt", "footer", "h1", "h2", "h3",
	"h4", "h5", "h6", "header", "li", "ol", "p", "section", "table", "tr", "ul",
];

/// Read syllabus text from `path`, or stdin when `None`. HTML input is
/// reduced to its visible text.
///
/// # Errors
///
/// Any I/O error from reading the file or stdin.
pub fn read_from_file<P: AsRef<Path>>(path: Option<P>) -> io::Result<String> {
	let (text, html_extension) = if let Some(path) = path {
		let path = path.as_ref();
		let html = path
			.extension()
			.and_then(|ext| ext.to_str())
			.is_some_and(|ext| ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"));

		(fs::read_to_string(path)?, html)
	} else {
		let mut text = String::new();
		io::stdin().read_to_string(&mut text)?;
		(text, false)
	};

	if html_extension || looks_like_html(&text) {
		Ok(text_from_html(&text))
	} else {
		Ok(text)
	}
}

fn looks_like_html(text: &str) -> bool {
	let head = text.trim_start();

	["<!doctype html", "<html", "<body"].iter().any(|prefix| {
		head.get(..prefix.len())
			.is_some_and(|start| start.eq_ignore_ascii_case(prefix))
	})
}

/// Visible text of an HTML document, one block element per line. Script and
/// style contents are skipped.
#[must_use]
pub fn text_from_html(html: &str) -> String {
	let document = Document::from(html);
	let mut out = String::new();

	let root = document
		.find(Name("body"))
		.next()
		.or_else(|| document.nth(0));

	if let Some(root) = root {
		collect_text(root, &mut out);
	}

	out.lines()
		.map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
		.filter(|line| !line.is_empty())
		.collect::<Vec<_>>()
		.join("\n")
}

fn collect_text(node: Node, out: &mut String) {
	match node.data() {
		Data::Text(text) => out.push_str(text),
		Data::Element(..) => {
			let name = node.name().unwrap_or_default();

			if matches!(name, "script" | "style" | "head" | "noscript") {
				return;
			}

			for child in node.children() {
				collect_text(child, out);
			}

			if BLOCK_ELEMENTS.contains(&name) || matches!(name, "td" | "th") {
				out.push(if matches!(name, "td" | "th") { ' ' } else { '\n' });
			}
		}
		Data::Comment(_) => {}
	}
}
