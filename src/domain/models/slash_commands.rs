#[cfg(test)]
#[path = "slash_commands_test.rs"]
mod tests;

pub struct SlashCommand {
    command: String,
    pub args: Vec<String>,
}

impl SlashCommand {
    pub fn parse(text: &str) -> Option<SlashCommand> {
        let mut args = text
            .trim()
            .split(' ')
            .filter(|e| return !e.is_empty())
            .map(|e| return e.to_string())
            .collect::<Vec<String>>();
        if args.is_empty() {
            return None;
        }
        let prefix = args[0].to_string();
        args.remove(0);

        let cmd = SlashCommand {
            command: prefix,
            args,
        };
        if cmd.is_quit()
            || cmd.is_help()
            || cmd.is_export()
            || cmd.is_build()
            || cmd.is_cancel_build()
            || cmd.is_retry()
            || cmd.is_screens()
            || cmd.is_show()
            || cmd.is_next()
            || cmd.is_prev()
            || cmd.is_skip()
        {
            return Some(cmd);
        }

        return None;
    }

    pub fn is_quit(&self) -> bool {
        return ["/q", "/quit", "/exit"].contains(&self.command.as_str());
    }

    pub fn is_help(&self) -> bool {
        return ["/h", "/help"].contains(&self.command.as_str());
    }

    pub fn is_export(&self) -> bool {
        return ["/e", "/export"].contains(&self.command.as_str());
    }

    pub fn is_build(&self) -> bool {
        return ["/b", "/build"].contains(&self.command.as_str());
    }

    pub fn is_cancel_build(&self) -> bool {
        return ["/cb", "/cancel-build"].contains(&self.command.as_str());
    }

    pub fn is_retry(&self) -> bool {
        return ["/r", "/retry"].contains(&self.command.as_str());
    }

    pub fn is_screens(&self) -> bool {
        return ["/s", "/screens"].contains(&self.command.as_str());
    }

    pub fn is_show(&self) -> bool {
        return ["/show"].contains(&self.command.as_str()) && !self.args.is_empty();
    }

    pub fn is_next(&self) -> bool {
        return ["/n", "/next"].contains(&self.command.as_str());
    }

    pub fn is_prev(&self) -> bool {
        return ["/p", "/prev"].contains(&self.command.as_str());
    }

    pub fn is_skip(&self) -> bool {
        return ["/skip"].contains(&self.command.as_str());
    }
}
