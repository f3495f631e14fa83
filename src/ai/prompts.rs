/// Flatten the sheet grid for prompt embedding: a `COLUMNS:` header line,
/// then data rows numbered from 1, cells joined with ` | `. Rows shorter
/// than the header are padded with empty cells; longer rows keep their
/// extra cells.
pub fn format_sheet_data(rows: &[Vec<String>]) -> String {
    let headers = match rows.first() {
        Some(h) => h,
        None => return String::new(),
    };

    let mut out = format!("COLUMNS: {}\n\n", headers.join(" | "));

    for (i, row) in rows.iter().skip(1).enumerate() {
        let mut cells = row.clone();
        if cells.len() < headers.len() {
            cells.resize(headers.len(), String::new());
        }
        out.push_str(&format!("{}. {}\n", i + 1, cells.join(" | ")));
    }

    out
}

/// The full status-email prompt: dates, tone and variety instructions,
/// the fixed email structure, the styled action-items table template, and
/// the row-inclusion policy. The policy is enforced by the model, not
/// mechanically. This prompt is the contract.
pub fn daily_status(rows: &[Vec<String>], today: &str, yesterday: &str) -> String {
    let data_text = format_sheet_data(rows);

    format!(
        "Today: {today} | Yesterday: {yesterday}\n\
         \n\
         CRITICAL CREATIVITY INSTRUCTIONS:\n\
         - Use VARIED vocabulary - don't repeat the same words/phrases\n\
         - Write NATURALLY like a real person - avoid robotic patterns\n\
         - Each email should sound UNIQUE even with similar tasks\n\
         - Use SYNONYMS and different sentence structures\n\
         - Sound CONVERSATIONAL but professional\n\
         \n\
         Write a daily status email in PAST TENSE using this exact format:\n\
         \n\
         Hi [Manager name],\n\
         \n\
         Please refer below for my status updates today. Attached as well is my daily status \
         updates spreadsheet tracker as well as the link. Let me know if you will have any \
         questions or concerns.\n\
         \n\
         Key highlights:\n\
         [3-5 bullets with * - BE CREATIVE with wording:\n\
         - Use VARIED past-tense verbs (not just \"worked on\"): researched, explored, \
         investigated, examined, reviewed, analyzed, tested, experimented with, configured, \
         set up, implemented, built, created, developed, attended, participated in, finished, \
         completed, wrapped up, delivered, accomplished\n\
         - Be SPECIFIC about what you did - mention tools, features, systems by name\n\
         - Mix SHORT and LONG sentences for natural flow\n\
         - Avoid generic phrases like \"completed task\" - describe what you ACTUALLY did\n\
         - Each bullet should sound DIFFERENT from the others]\n\
         \n\
         Risk and Issues:\n\
         [1-3 bullets with * - BE CREATIVE with wording:\n\
         - Vary how you describe problems: encountered, ran into, faced, dealt with, noticed, \
         found, discovered, experienced difficulty with\n\
         - Be SPECIFIC about the actual issue - not just \"had problems\"\n\
         - Keep it real and authentic]\n\
         \n\
         Mitigation Plans:\n\
         [1-3 bullets with * - BE CREATIVE with wording:\n\
         - Vary your action words: addressed it by, resolved it through, fixed it with, \
         handled it via, worked around it by, coordinated with, reached out to, consulted\n\
         - Match these to the issues above\n\
         - Describe WHAT you actually did - be specific]\n\
         \n\
         Action Items:\n\
         [HTML table - only include rows where:\n\
         - Status=\"Completed\" AND Actual Date={yesterday}\n\
         - Status=\"Ongoing\"/\"In Progress\" AND Target Date={today}\n\
         - Status=\"Not Started\" AND Target Date<={today}]\n\
         \n\
         <table style=\"border-collapse: collapse; width: 100%; font-family: Arial, sans-serif; margin-top: 10px;\">\n\
         <thead>\n\
         <tr>\n\
         <th style=\"background-color: #373f6b; color: white; border: 1px solid #e0e0e0; padding: 10px; text-align: left; font-size: 9pt; font-weight: bold;\">Item #</th>\n\
         <th style=\"background-color: #373f6b; color: white; border: 1px solid #e0e0e0; padding: 10px; text-align: left; font-size: 9pt; font-weight: bold;\">Description</th>\n\
         <th style=\"background-color: #373f6b; color: white; border: 1px solid #e0e0e0; padding: 10px; text-align: left; font-size: 9pt; font-weight: bold;\">Responsible</th>\n\
         <th style=\"background-color: #373f6b; color: white; border: 1px solid #e0e0e0; padding: 10px; text-align: left; font-size: 9pt; font-weight: bold;\">Target Date of Completion</th>\n\
         <th style=\"background-color: #373f6b; color: white; border: 1px solid #e0e0e0; padding: 10px; text-align: left; font-size: 9pt; font-weight: bold;\">Actual Date of Completion</th>\n\
         <th style=\"background-color: #373f6b; color: white; border: 1px solid #e0e0e0; padding: 10px; text-align: left; font-size: 9pt; font-weight: bold;\">Status</th>\n\
         </tr>\n\
         </thead>\n\
         <tbody>\n\
         [rows here - Status colors: Completed=#0f9d58, Ongoing=#4285f4, Not Started=#999999]\n\
         </tbody>\n\
         </table>\n\
         \n\
         Thank you very much.\n\
         \n\
         Regards,\n\
         [Name from Responsible column]\n\
         \n\
         REMEMBER: Make each email UNIQUE by using:\n\
         - Different vocabulary (synonyms)\n\
         - Varied sentence structures\n\
         - Specific details about tasks\n\
         - Natural, conversational flow\n\
         \n\
         DATA:\n\
         {data_text}"
    )
}
