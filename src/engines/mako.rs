// Copyright (c) 2025 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Mako Engine Profile (Python)
 * Breakout table and code templates for Mako templates
 *
 * @copyright 2025 Bountyy Oy
 * @license Proprietary
 */

use super::{CodeTemplates, EngineProfile, TagPair};
use crate::context::Context;
use crate::escape::python_literal;

/// Breakouts for every enclosing construct the injection may sit in.
///
/// Comments show the enclosing template with `%s` marking the reflection.
const MAKO_CONTEXTS: &[Context] = &[
    // ${%s}
    Context::new(1, "1}", ""),
    // ${'%s'}
    Context::new(2, "1'}", ""),
    // ${"%s"}
    Context::new(2, "1\"}", ""),
    // ${"""%s"""}
    Context::new(2, "1\"\"\"}", ""),
    // ${(%s)}
    Context::new(3, "1)}", ""),
    // ${('%s')}
    Context::new(3, "1')}", ""),
    // ${("%s")}
    Context::new(3, "1\")}", ""),
    // ${("""%s""")}
    Context::new(3, "1\"\"\")}", ""),
    // ${[%s]}
    Context::new(4, "1]}", ""),
    // ${['%s']}
    Context::new(4, "1']}", ""),
    // ${["%s"]}
    Context::new(4, "1\"]}", ""),
    // ${["""%s"""]}
    Context::new(4, "1\"\"\"]}", ""),
    // ${([%s])}
    Context::new(4, "1])}", ""),
    // ${(['%s'])}
    Context::new(4, "1'])}", ""),
    // ${(["%s"])}
    Context::new(4, "1\"])}", ""),
    // ${(["""%s"""])}
    Context::new(4, "1\"\"\"])}", ""),
    // ${{%s}}
    Context::new(5, "1:1}}", ""),
    // ${{'%s':1}}
    Context::new(5, "1':1}}", ""),
    // ${{"%s":1}}
    Context::new(5, "1\":1}}", ""),
    // ${{"""%s""":1}}
    Context::new(5, "1\"\"\":1}}", ""),
    // ${{1:%s}}
    Context::new(5, "1}}", ""),
    // ${{1:'%s'}}
    Context::new(5, "1'}}", ""),
    // ${{1:"%s"}}
    Context::new(5, "1\"}}", ""),
    // ${{1:"""%s"""}}
    Context::new(5, "1\"\"\"}}", ""),
    // <% %s %>, <%! %s %>, <% %s=1 %>
    Context::new(1, "%>", "<%#"),
    // <% a=%s %>
    Context::new(2, "1%>", "<%#"),
    // <% a='%s' %>
    Context::new(2, "1'%>", "<%#"),
    // <% a="%s" %>
    Context::new(2, "1\"%>", "<%#"),
    // <% a="""%s""" %>
    Context::new(2, "1\"\"\"%>", "<%#"),
    // <% a=range(%s) %>
    Context::new(3, "1)%>", "<%#"),
    // <% a=''.join('%s') %>
    Context::new(3, "1')%>", "<%#"),
    // <% a=''.join("%s") %>
    Context::new(3, "1\")%>", "<%#"),
    // <% a=''.join("""%s""") %>
    Context::new(3, "1\"\"\")%>", "<%#"),
    // <% [%s] %>, <% a=[%s] %>
    Context::new(4, "1]%>", "<%#"),
    // <% a=['%s'] %>
    Context::new(4, "1']%>", "<%#"),
    // <% a=["%s"] %>
    Context::new(4, "1\"]%>", "<%#"),
    // <% a=["""%s"""] %>
    Context::new(4, "1\"\"\"]%>", "<%#"),
    // <% a=set([%s]) %>
    Context::new(4, "1])%>", "<%#"),
    // <% a=set(['%s']) %>
    Context::new(4, "1'])%>", "<%#"),
    // <% a=set(["%s"]) %>
    Context::new(4, "1\"])%>", "<%#"),
    // <% a=set(["""%s"""]) %>
    Context::new(4, "1\"\"\"])%>", "<%#"),
    // <% {%s} %>, <% a={%s} %>
    Context::new(5, "1:1}%>", "<%#"),
    // <% a={'%s':1} %>
    Context::new(5, "1':1}%>", "<%#"),
    // <% a={"%s":1} %>
    Context::new(5, "1\":1}%>", "<%#"),
    // <% a={"""%s""":1} %>
    Context::new(5, "1\"\"\":1}%>", "<%#"),
    // <% a={1:%s} %>
    Context::new(5, "1}%>", "<%#"),
    // <% a={1:'%s'} %>
    Context::new(5, "1'}%>", "<%#"),
    // <% a={1:"%s"} %>
    Context::new(5, "1\"}%>", "<%#"),
    // <% a={1:"""%s"""} %>
    Context::new(5, "1\"\"\"}%>", "<%#"),
    // % if %s:  /  % for a in %s:  /  % if %s==1:
    Context::new(2, "'a':#\n", "\n"),
    // % if '%s'=='':
    Context::new(2, "a':#\n", "\n"),
    // % if "%s"=='':
    Context::new(2, "a\":#\n", "\n"),
    // % if """%s"""=='':
    Context::new(2, "a\"\"\":#\n", "\n"),
    // % if (%s)==1:
    Context::new(3, "'a'):#\n", "\n"),
    // % if ('%s')=='':
    Context::new(3, "a'):#\n", "\n"),
    // % if ("%s")=='':
    Context::new(3, "a\"):#\n", "\n"),
    // % if ("""%s""")=='':
    Context::new(3, "a\"\"\"):#\n", "\n"),
    // % if [%s]:  /  % for a in [%s]:
    Context::new(4, "'a']:#\n", "\n"),
    // % if ['%s']:
    Context::new(4, "a']:#\n", "\n"),
    // % if ["%s"]:
    Context::new(4, "a\"]:#\n", "\n"),
    // % if ["""%s"""]:
    Context::new(4, "a\"\"\"]:#\n", "\n"),
    // % if ([%s]):
    Context::new(4, "'a']):#\n", "\n"),
    // % if (['%s']):
    Context::new(4, "a']):#\n", "\n"),
    // % if (["%s"]):
    Context::new(4, "a\"]):#\n", "\n"),
    // % if (["""%s"""]):
    Context::new(4, "a\"\"\"]):#\n", "\n"),
    // % if {%s}:  /  % for a in {%s}:
    Context::new(5, "1:1}:#\n", "\n"),
    // % if {'%s':1}:
    Context::new(5, "a':1}:#\n", "\n"),
    // % if {"%s":1}:
    Context::new(5, "a\":1}:#\n", "\n"),
    // % if {"""%s""":1}:
    Context::new(5, "a\"\"\":1}:#\n", "\n"),
    // % if {1:%s}:
    Context::new(5, "1}:#\n", "\n"),
    // % if {1:'%s'}:
    Context::new(5, "a'}:#\n", "\n"),
    // % if {1:"%s"}:
    Context::new(5, "a\"}:#\n", "\n"),
    // % if {1:"""%s"""}:
    Context::new(5, "a\"\"\"}:#\n", "\n"),
    // <%doc>%s</%doc>
    Context::new(5, "</%doc>", "<%doc>"),
    // <%block>%s</%block>
    Context::new(5, "</%block>", "<%block>"),
    // <%text>%s</%text>
    Context::new(5, "</%text>", "<%text>"),
];

pub static MAKO: EngineProfile = EngineProfile {
    name: "mako",
    language: "python",
    expression_tag: TagPair {
        open: "${",
        close: "}",
    },
    block_tag: TagPair {
        open: "<% ",
        close: " %>",
    },
    contexts: MAKO_CONTEXTS,
    code: CodeTemplates {
        output_var: "x",
        sentinel: "x={a}*{b}",
        marker: "{a}+{b}",
        join: "{separator}.join({chars})",
        platform: "import sys, os; x=os.name+'-'+sys.platform",
        exec: "x=__import__('subprocess').run({command},shell=True,stdout=-1,stderr=-2).stdout.decode(errors='replace')",
        digest: "x=__import__('hashlib').sha256(open({path},'rb').read()).hexdigest()",
        read: "x=__import__('base64').b64encode(open({path},'rb').read()).decode()",
        truncate: "open({path},'w').close()",
        append: "open({path},'ab+').write(__import__('base64').urlsafe_b64decode({chunk}))",
        size: "x=__import__('os').path.getsize({path})",
        exists: "x=__import__('os').path.exists({path})",
    },
    quote: python_literal,
};
