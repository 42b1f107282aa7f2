/// Integration tests against on-disk databases and the MCP server
mod basic_integration;
mod mcp_server;
