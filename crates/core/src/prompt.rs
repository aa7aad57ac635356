use crate::deadline::Kind;

const BEGIN_SYLLABUS: &str = "----- BEGIN SYLLABUS -----";
const END_SYLLABUS: &str = "----- END SYLLABUS -----";

/// Build the extraction prompt for `syllabus`. Dates without a year are to be
/// placed in `default_year`.
#[must_use]
pub fn build_prompt(syllabus: &str, default_year: i32) -> String {
	let types = Kind::ALL
		.iter()
		.filter(|kind| **kind != Kind::Other)
		.map(|kind| kind.as_str())
		.collect::<Vec<_>>()
		.join(", ");

	format!(
		"Extract every deadline from the syllabus below: assignments, exams, quizzes, \
		 projects, presentations and any other dated due item.\n\
		 \n\
		 Return ONLY a valid JSON array. Do not add commentary and do not wrap it in \
		 markdown code fences.\n\
		 Each element must be an object with exactly these fields:\n\
		 - \"title\": short label, e.g. \"Assignment 1\"\n\
		 - \"date\": the due date in YYYY-MM-DD format\n\
		 - \"type\": one of {types}, other\n\
		 - \"description\": short details, or null if there are none\n\
		 \n\
		 If a date has no year or the year is ambiguous, assume {default_year}.\n\
		 Example: [{{\"title\":\"Assignment 1\",\"date\":\"{default_year}-01-25\",\
		 \"type\":\"assignment\",\"description\":\"Details\"}}]\n\
		 \n\
		 {BEGIN_SYLLABUS}\n\
		 {syllabus}\n\
		 {END_SYLLABUS}\n"
	)
}
